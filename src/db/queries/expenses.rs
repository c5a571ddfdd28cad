use crate::models::expense::{Expense, ExpenseWithCategory, NewExpense};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, trace};

/// Optional predicates for the expense list endpoint, applied in SQL.
/// Every query is additionally scoped to the owning user.
#[derive(Default)]
pub struct ExpenseFilter {
    pub category_id: Option<i64>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub limit: Option<i64>,
}

pub fn list_expenses(
    conn: &Connection,
    user_id: i64,
    filter: &ExpenseFilter,
) -> rusqlite::Result<Vec<ExpenseWithCategory>> {
    let mut sql = String::from(
        "SELECT e.id, e.user_id, e.date, e.amount_cents, e.description,
                e.category_id, e.created_at, c.name as category_name
         FROM expenses e
         LEFT JOIN categories c ON e.category_id = c.id
         WHERE e.user_id = ?",
    );
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

    if let Some(category_id) = filter.category_id {
        sql.push_str(" AND e.category_id = ?");
        params_vec.push(Box::new(category_id));
    }
    if let Some(ref from_date) = filter.from_date {
        sql.push_str(" AND e.date >= ?");
        params_vec.push(Box::new(from_date.clone()));
    }
    if let Some(ref to_date) = filter.to_date {
        sql.push_str(" AND e.date <= ?");
        params_vec.push(Box::new(to_date.clone()));
    }

    sql.push_str(" ORDER BY e.date DESC, e.id DESC");

    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(Box::new(limit));
    }

    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;

    let expense_iter = stmt.query_map(params_refs.as_slice(), |row| {
        Ok(ExpenseWithCategory {
            expense: Expense {
                id: row.get(0)?,
                user_id: row.get(1)?,
                date: row.get(2)?,
                amount_cents: row.get(3)?,
                description: row.get(4)?,
                category_id: row.get(5)?,
                created_at: row.get(6)?,
            },
            category_name: row.get(7)?,
        })
    })?;

    let expenses: Vec<ExpenseWithCategory> = expense_iter.filter_map(|e| e.ok()).collect();

    debug!(user_id, count = expenses.len(), "Listed expenses");
    Ok(expenses)
}

pub fn get_expense(
    conn: &Connection,
    user_id: i64,
    id: i64,
) -> rusqlite::Result<Option<ExpenseWithCategory>> {
    trace!(expense_id = id, "Fetching expense");
    conn.query_row(
        "SELECT e.id, e.user_id, e.date, e.amount_cents, e.description,
                e.category_id, e.created_at, c.name
         FROM expenses e
         LEFT JOIN categories c ON e.category_id = c.id
         WHERE e.id = ? AND e.user_id = ?",
        params![id, user_id],
        |row| {
            Ok(ExpenseWithCategory {
                expense: Expense {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    date: row.get(2)?,
                    amount_cents: row.get(3)?,
                    description: row.get(4)?,
                    category_id: row.get(5)?,
                    created_at: row.get(6)?,
                },
                category_name: row.get(7)?,
            })
        },
    )
    .optional()
}

pub fn create_expense(
    conn: &Connection,
    user_id: i64,
    expense: &NewExpense,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO expenses (user_id, date, amount_cents, description, category_id)
         VALUES (?, ?, ?, ?, ?)",
        params![
            user_id,
            expense.date,
            expense.amount_cents,
            expense.description,
            expense.category_id,
        ],
    )?;

    let id = conn.last_insert_rowid();
    debug!(
        expense_id = id,
        user_id,
        amount_cents = expense.amount_cents,
        "Created expense"
    );
    Ok(id)
}

pub fn delete_expense(conn: &Connection, user_id: i64, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "DELETE FROM expenses WHERE id = ? AND user_id = ?",
        params![id, user_id],
    )?;
    if rows > 0 {
        debug!(expense_id = id, user_id, "Deleted expense");
    }
    Ok(rows > 0)
}
