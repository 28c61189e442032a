use crate::{
    auth::password::hash_password,
    model::{role::Role, user::NewUser},
    store::UserDirectory,
};
use anyhow::{Context, Result};

struct DemoUser {
    email: &'static str,
    password: &'static str,
    name: &'static str,
    role: Role,
    employee_id: &'static str,
}

const DEMO_USERS: [DemoUser; 3] = [
    DemoUser {
        email: "karyawan1@example.com",
        password: "karyawan123",
        name: "Budi Santoso",
        role: Role::Employee,
        employee_id: "EMP001",
    },
    DemoUser {
        email: "karyawan2@example.com",
        password: "karyawan123",
        name: "Siti Nurhaliza",
        role: Role::Employee,
        employee_id: "EMP002",
    },
    DemoUser {
        email: "hrd@example.com",
        password: "hrd123",
        name: "Admin HRD",
        role: Role::Hrd,
        employee_id: "HRD001",
    },
];

/// Creates the demo accounts that are not there yet. Returns how many were created.
pub async fn seed_demo_users(users: &dyn UserDirectory) -> Result<usize> {
    let mut created = 0usize;

    for demo in &DEMO_USERS {
        if users
            .find_credentials(demo.email)
            .await
            .with_context(|| format!("looking up {}", demo.email))?
            .is_some()
        {
            continue;
        }

        let password_hash = hash_password(demo.password)
            .with_context(|| format!("hashing password of {}", demo.email))?;

        users
            .create_user(NewUser {
                email: demo.email.to_string(),
                password_hash,
                name: demo.name.to_string(),
                role: demo.role,
                employee_id: Some(demo.employee_id.to_string()),
            })
            .await
            .with_context(|| format!("creating {}", demo.email))?;
        created += 1;
    }

    log::info!("Demo user seeding complete: {} created", created);
    Ok(created)
}
