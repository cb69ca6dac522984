//! Demo patients for the console app.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::Patient;

fn patient(
    id: u128,
    name: &str,
    mobile: &str,
    whatsapp: &str,
    email: &str,
    address: &str,
    created_at: (i32, u32, u32),
) -> Option<Patient> {
    Some(Patient {
        id: Uuid::from_u128(id),
        name: name.to_string(),
        mobile_number: mobile.to_string(),
        whatsapp_number: whatsapp.to_string(),
        whatsapp_same_as_mobile: mobile == whatsapp,
        email: Some(email.to_string()),
        address: Some(address.to_string()),
        created_at: NaiveDate::from_ymd_opt(created_at.0, created_at.1, created_at.2)?,
    })
}

pub fn sample_patients() -> Vec<Patient> {
    [
        patient(
            1,
            "John Doe",
            "9876543210",
            "9876543210",
            "john.doe@email.com",
            "123 Main St, City, State 12345",
            (2024, 1, 15),
        ),
        patient(
            2,
            "Jane Smith",
            "9876543211",
            "9876543212",
            "jane.smith@email.com",
            "456 Oak Ave, City, State 12345",
            (2024, 1, 20),
        ),
        patient(
            3,
            "Bob Johnson",
            "9876543213",
            "9876543213",
            "bob.johnson@email.com",
            "789 Pine St, City, State 12345",
            (2024, 2, 2),
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}
