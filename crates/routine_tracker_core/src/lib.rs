pub mod calendar;
pub mod domain;
pub mod ports;
pub mod stats;

pub use calendar::MonthWindow;
pub use domain::{
    Book, BookStatus, DailyRecord, Dated, DomainError, DomainResult, MealRecord, MealType,
    ReadingRecord, ReadingSession, RecordCategory,
};
pub use ports::{PortError, PortResult, RecordRepository};
pub use stats::{BookSnapshot, MonthlyStats};
