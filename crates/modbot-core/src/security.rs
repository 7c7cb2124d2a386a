use std::collections::HashSet;

use crate::{domain::UserId, errors::Error, Result};

// ============== Authorization ==============

/// Fixed set of bot administrators, loaded once at startup.
///
/// One flat allow-list governs every privileged command, independent of the
/// chat the command was issued in.
#[derive(Clone, Debug)]
pub struct AdminSet {
    ids: HashSet<i64>,
}

impl AdminSet {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Result<Self> {
        let admins = Self {
            ids: ids.into_iter().collect(),
        };
        if admins.is_empty() {
            return Err(Error::Config(
                "at least one bot admin must be configured (MODBOT_ADMINS)".to_string(),
            ));
        }
        Ok(admins)
    }

    pub fn is_admin(&self, user_id: Option<UserId>) -> bool {
        let Some(user_id) = user_id else {
            return false;
        };
        self.ids.contains(&user_id.0)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_admin_set_is_rejected() {
        assert!(matches!(AdminSet::new(Vec::new()), Err(Error::Config(_))));
    }

    #[test]
    fn membership() {
        let admins = AdminSet::new([123456789, 42]).unwrap();
        assert!(admins.is_admin(Some(UserId(42))));
        assert!(!admins.is_admin(Some(UserId(43))));
        assert!(!admins.is_admin(None));
        assert_eq!(admins.len(), 2);
    }
}
