use anyhow::Result;

use super::files::{record, text, Record, Store, MEMBERS};
use super::loan_list;
use crate::models::{Loan, Member};

/// Load every member in file order.
pub fn fetch_members(store: &Store) -> Result<Vec<Member>> {
    let members = store
        .load(&MEMBERS)?
        .iter()
        .map(|row| Member {
            id: text(row, "id"),
            name: text(row, "name"),
            contact: text(row, "contact"),
        })
        .collect();
    Ok(members)
}

/// Rewrite the members table. The `borrowed_books` column is regenerated from
/// the active loans so it always mirrors the loans table.
pub fn save_members(store: &Store, members: &[Member], loans: &[Loan]) -> Result<()> {
    let records: Vec<Record> = members
        .iter()
        .map(|member| member_to_record(member, loans))
        .collect();
    store.save(&MEMBERS, &records)
}

fn member_to_record(member: &Member, loans: &[Loan]) -> Record {
    let borrowed = loan_list::encode(
        loans
            .iter()
            .filter(|loan| loan.is_active() && loan.member_id == member.id)
            .map(|loan| (loan.book_id.as_str(), loan.borrowed_on)),
    );
    record([
        ("id", member.id.clone()),
        ("name", member.name.clone()),
        ("contact", member.contact.clone()),
        ("borrowed_books", borrowed),
    ])
}
