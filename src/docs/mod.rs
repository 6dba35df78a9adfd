mod list;
mod members;
mod page;
mod visibility;

pub use list::DocList;
pub use members::{AccessList, AddMembers};
pub use page::DocPage;
pub use visibility::DocVisibility;
