pub mod boat;
pub mod reservation;
pub mod tour;
