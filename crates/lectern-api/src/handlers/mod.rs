pub mod courses;
pub mod health;
pub mod presign;
pub mod storage;
