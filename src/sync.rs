use crate::api::ExpenseApi;
use crate::error::Result;
use crate::models::Expense;
use crate::session::Session;

/// Outcome of a mutation plus the refreshed expense list.
pub struct Synced<T> {
    pub outcome: T,
    /// None when the mutation succeeded but the refetch did not.
    pub expenses: Option<Vec<Expense>>,
}

/// Every create/update/delete goes through here: run the mutation, then
/// replace the local list with a full refetch. A failed mutation skips the
/// refetch. A failed refetch does not undo a successful mutation.
pub fn mutate_then_resync<A, T, F>(api: &A, session: &Session, mutation: F) -> Result<Synced<T>>
where
    A: ExpenseApi + ?Sized,
    F: FnOnce(&A) -> Result<T>,
{
    let outcome = mutation(api)?;
    let expenses = match api.list_expenses(&session.user_id) {
        Ok(list) => Some(list),
        Err(e) => {
            log::warn!("refresh after change failed: {e}");
            None
        }
    };
    Ok(Synced { outcome, expenses })
}
