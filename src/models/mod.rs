mod contact;
mod contact_detail;
mod interaction;
mod record;
mod tag;
mod task;

pub use contact::{Contact, NewContact};
pub use contact_detail::{ContactDetail, ContactListing};
pub use interaction::InteractionLog;
pub use record::RecordKind;
pub use tag::{collect_tags, parse_tags, TagSet};
pub use task::{parse_due_date, FollowUpTask};
