//! Demo doctors for the console app.

use uuid::Uuid;

use shared_models::SessionType;

use crate::models::{Doctor, Gender};

fn doctor(
    id: u128,
    name: &str,
    expertise: &str,
    gender: Gender,
    session_modes: &[SessionType],
    session_fee: u32,
) -> Doctor {
    Doctor {
        id: Uuid::from_u128(0xD0C7_0000 + id),
        name: name.to_string(),
        phone: "+91 98765 43210".to_string(),
        expertise: expertise.to_string(),
        gender,
        session_modes: session_modes.to_vec(),
        session_fee,
    }
}

pub fn sample_doctors() -> Vec<Doctor> {
    let both = [SessionType::InPerson, SessionType::Online];

    vec![
        doctor(1, "Dr. Tejas Sharma", "Gynaecology", Gender::Male, &both, 1500),
        doctor(2, "Dr. Priya Kapoor", "IVF Specialist", Gender::Female, &both, 2000),
        doctor(3, "Dr. Pranav Saxena", "Gynaecology", Gender::Male, &both, 1800),
        doctor(4, "Dr. Toshib Bagde", "Psychologist", Gender::Female, &[SessionType::Online], 1200),
    ]
}
