pub mod environmental;
pub mod financial;
pub mod formatting;
pub mod gamification;
pub mod loan;
pub mod pipeline;
pub mod providers;
pub mod sizing;
pub mod subsidy;
