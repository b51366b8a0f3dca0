//! Domain types and models
//!
//! Everything the client hands back to callers, plus the loosely shaped
//! import input accepted by `new_import_process`.

pub mod import;
pub mod lists;
pub mod messages;
pub mod statistics;

pub use import::{
    GroupSelection, ImportChannel, ImportInput, ImportItem, ImportOptions, ImportProcess,
    ImportStatus, MobileInputType, RawRecord, SubscriberFields,
};
pub use lists::{ConsoleGroup, ConsoleList, Group, List, MailingList};
pub use messages::{ClickReport, Message, MessageReport, NewsletterCode, OpenReport, UrlClicks};
pub use statistics::{MessageStatistics, Page, Paging, RecipientActivity};
