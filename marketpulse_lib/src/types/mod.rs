mod impact;
pub use self::impact::ImpactCategory;

mod meta;
pub use self::meta::UploadMetadata;

mod record;
pub use self::record::{Record, RecordID};
