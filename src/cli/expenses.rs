use std::io::{BufRead, Write};

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::api::ExpenseApi;
use crate::cli::Context;
use crate::error::{Result, TallyError};
use crate::fmt::{human_date, money, plain_number};
use crate::forms::{EditForm, NewExpenseForm};
use crate::models::{Expense, ExpenseId};
use crate::reports::summarize;
use crate::session::Session;
use crate::sync::{mutate_then_resync, Synced};

/// Notice printed after a successful change, with the refreshed total when
/// the refetch worked.
fn describe_sync(message: &str, synced: &Synced<impl Sized>, currency: &str) -> String {
    match &synced.expenses {
        Some(list) => {
            let s = summarize(list);
            format!(
                "{message}\n{} expenses, {} total",
                s.count,
                money(currency, s.total)
            )
        }
        None => format!(
            "{message}\n{}",
            "Could not refresh the expense list; run `tally list` to see the latest.".yellow()
        ),
    }
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

pub fn add(ctx: &Context, date: &str, item: &str, cost: &str) -> Result<()> {
    let session = ctx.session()?;
    let out = add_with(&ctx.api()?, ctx, &session, date, item, cost)?;
    println!("{out}");
    Ok(())
}

pub fn add_with<A: ExpenseApi + ?Sized>(
    api: &A,
    ctx: &Context,
    session: &Session,
    date: &str,
    item: &str,
    cost: &str,
) -> Result<String> {
    let Some(user_id) = session.numeric_user_id() else {
        ctx.sessions.clear()?;
        return Err(TallyError::Validation(
            "User not found, please log in again".into(),
        ));
    };
    let request = NewExpenseForm { date, item, cost }.into_request(user_id)?;
    let synced = mutate_then_resync(api, session, |api| api.add_expense(&request))?;
    Ok(describe_sync(&synced.outcome, &synced, ctx.currency()))
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

pub fn list(ctx: &Context) -> Result<()> {
    let session = ctx.session()?;
    let expenses = ctx.api()?.list_expenses(&session.user_id)?;
    println!("{}", format_list(&expenses, ctx.currency()));
    Ok(())
}

pub fn format_list(expenses: &[Expense], currency: &str) -> String {
    if expenses.is_empty() {
        return "No expenses yet. Add one with `tally add`.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Item", "Cost"]);
    for e in expenses {
        table.add_row(vec![
            Cell::new(&e.id),
            Cell::new(human_date(e.parsed_date())),
            Cell::new(e.label()),
            Cell::new(money(currency, e.amount())),
        ]);
    }
    format!("Expenses ({})\n{table}", expenses.len())
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

pub fn edit(ctx: &Context, id: &str, item: Option<&str>, cost: Option<&str>) -> Result<()> {
    let session = ctx.session()?;
    let out = edit_with(&ctx.api()?, &session, ctx.currency(), id, item, cost)?;
    println!("{out}");
    Ok(())
}

/// Unspecified fields keep the record's current values, which are validated
/// again like typed input: a stored negative cost blocks an item-only edit.
pub fn edit_with<A: ExpenseApi + ?Sized>(
    api: &A,
    session: &Session,
    currency: &str,
    id: &str,
    item: Option<&str>,
    cost: Option<&str>,
) -> Result<String> {
    let id = ExpenseId::from(id);
    let current = api
        .list_expenses(&session.user_id)?
        .into_iter()
        .find(|e| e.id == id)
        .ok_or_else(|| TallyError::UnknownExpense(id.to_string()))?;

    let current_cost = plain_number(current.amount());
    let update = EditForm {
        item: item.unwrap_or(current.label()),
        cost: cost.unwrap_or(&current_cost),
    }
    .into_update()?;

    let synced = mutate_then_resync(api, session, |api| api.update_expense(&id, &update))?;
    Ok(describe_sync(&synced.outcome, &synced, currency))
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

pub fn delete(ctx: &Context, id: &str, yes: bool) -> Result<()> {
    let session = ctx.session()?;
    if !yes && !confirm(&format!("Delete expense {id}? This cannot be undone. [y/N] "))? {
        println!("Cancelled.");
        return Ok(());
    }
    let out = delete_with(&ctx.api()?, &session, ctx.currency(), id)?;
    println!("{out}");
    Ok(())
}

pub fn delete_with<A: ExpenseApi + ?Sized>(
    api: &A,
    session: &Session,
    currency: &str,
    id: &str,
) -> Result<String> {
    let id = ExpenseId::from(id);
    let synced = mutate_then_resync(api, session, |api| api.delete_expense(&id))?;
    Ok(describe_sync(&synced.outcome, &synced, currency))
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
