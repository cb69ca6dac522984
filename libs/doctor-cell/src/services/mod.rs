pub mod doctor;

pub use doctor::{DoctorRepository, DoctorService, InMemoryDoctorRepository};
