pub mod answer;
pub mod pool;
pub mod question;
pub mod report;
pub mod response;
pub mod section;
