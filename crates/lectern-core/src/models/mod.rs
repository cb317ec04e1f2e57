pub mod commit;
pub mod course;
pub mod object_key;
pub mod presign;
pub mod record;
pub mod slot;

pub use commit::*;
pub use course::*;
pub use object_key::*;
pub use presign::*;
pub use record::*;
pub use slot::*;
