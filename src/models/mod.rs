pub mod category;
pub mod expense;
pub mod user;

pub use category::Category;
pub use expense::{Expense, ExpenseWithCategory, NewExpense};
pub use user::User;
