//! Member directory: registration and listings.

use tracing::info;

use crate::error::{LibraryError, LibraryResult};
use crate::loans::member_loans;
use crate::models::{Member, MemberLoan};
use crate::store::{fetch_loans, fetch_members, next_id, save_members, Store};

/// Register a member with no loans.
pub fn register_member(store: &Store, name: &str, contact: &str) -> LibraryResult<Member> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LibraryError::invalid_input("Member name is required."));
    }

    let mut members = fetch_members(store)?;
    let loans = fetch_loans(store)?;
    let member = Member {
        id: next_id(members.iter().map(|member| member.id.as_str())),
        name: name.to_string(),
        contact: contact.trim().to_string(),
    };
    members.push(member.clone());
    save_members(store, &members, &loans)?;

    info!(member_id = %member.id, name = %member.name, "registered member");
    Ok(member)
}

pub fn list_members(store: &Store) -> LibraryResult<Vec<Member>> {
    Ok(fetch_members(store)?)
}

/// Books currently held by a member.
pub fn borrowed_books(store: &Store, member_id: &str) -> LibraryResult<(Member, Vec<MemberLoan>)> {
    member_loans(store, member_id)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::catalog::add_book;
    use crate::loans::borrow_book;

    #[test]
    fn registration_assigns_ids_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let ada = register_member(&store, "Ada", "ada@example.org").unwrap();
        let bob = register_member(&store, " Bob ", "").unwrap();

        assert_eq!((ada.id.as_str(), bob.id.as_str()), ("1", "2"));
        assert_eq!(bob.name, "Bob");
        assert_eq!(list_members(&store).unwrap(), vec![ada, bob]);
        assert!(matches!(
            borrowed_books(&store, "3"),
            Err(LibraryError::MemberNotFound(_))
        ));
    }

    #[test]
    fn blank_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        assert!(matches!(
            register_member(&store, "  ", "x"),
            Err(LibraryError::InvalidInput(_))
        ));
        assert!(list_members(&store).unwrap().is_empty());
    }

    #[test]
    fn registering_keeps_existing_loans_in_the_members_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        register_member(&store, "Ada", "").unwrap();
        add_book(&store, "Dune", "Frank Herbert", "", 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        borrow_book(&store, "1", "1", today).unwrap();

        register_member(&store, "Bob", "").unwrap();

        let (ada, loans) = borrowed_books(&store, "1").unwrap();
        assert_eq!(ada.name, "Ada");
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].book.title, "Dune");
        let (_, none) = borrowed_books(&store, "2").unwrap();
        assert!(none.is_empty());
    }
}
