//! Database seeder for Scholaris development and testing.
//!
//! Applies pending migrations, then seeds a super admin, a demo school with
//! its admin, a class with a fee breakdown payable in three installments,
//! and one student enrolled into that class. Running it twice
//! is harmless: existing rows are detected by email and left alone.
//!
//! Usage: cargo run --bin seeder
//!
//! `SEED_ADMIN_EMAIL` and `SEED_ADMIN_PASSWORD` override the super admin login.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm_migration::MigratorTrait;

use scholaris_core::auth::{PrincipalDirectory, Role, hash_password, normalize_email};
use scholaris_core::provisioning::{
    NewClass, NewClassFeeStructure, NewPrincipal, NewSchool, NewStudent, ProvisioningStore,
};
use scholaris_db::migration::Migrator;
use scholaris_db::{SchoolRepository, UserRepository};
use scholaris_shared::fees::FeeComponents;
use scholaris_shared::types::{
    ClassFeeStructureId, ClassId, Money, SchoolId, StudentId, UserId,
};

const DEFAULT_ADMIN_EMAIL: &str = "root@scholaris.local";
const DEFAULT_ADMIN_PASSWORD: &str = "change-me-now";
const DEMO_SCHOOL_EMAIL: &str = "office@demo-school.local";
const DEMO_SCHOOL_ADMIN: &str = "admin@demo-school.local";
const DEMO_PASSWORD: &str = "demo-password";
const DEMO_ACADEMIC_YEAR: &str = "2024-25";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    println!("Connecting to database...");
    let db = scholaris_db::connect(&database_url).await?;

    println!("Applying migrations...");
    Migrator::up(&db, None).await?;

    let users = UserRepository::new(db.clone());
    let schools = SchoolRepository::new(db);

    println!("Seeding super admin...");
    seed_super_admin(&users, &schools).await?;

    println!("Seeding demo school...");
    seed_demo_school(&users, &schools).await?;

    println!("Seeding complete!");
    Ok(())
}

fn principal(
    email: &str,
    password: &str,
    full_name: &str,
    role: Role,
    school_id: Option<SchoolId>,
) -> Result<NewPrincipal> {
    Ok(NewPrincipal {
        id: UserId::new(),
        email: normalize_email(email),
        password_hash: hash_password(password)?,
        full_name: full_name.to_string(),
        role,
        school_id,
    })
}

async fn seed_super_admin(users: &UserRepository, schools: &SchoolRepository) -> Result<()> {
    let email = std::env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.into());
    let password =
        std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.into());

    if users.find_by_email(&normalize_email(&email)).await?.is_some() {
        println!("  Super admin {email} already exists, skipping");
        return Ok(());
    }

    let admin = principal(&email, &password, "Platform Administrator", Role::SuperAdmin, None)?;
    schools.insert_principal(admin).await?;
    println!("  Created super admin {email}");
    Ok(())
}

async fn seed_demo_school(users: &UserRepository, schools: &SchoolRepository) -> Result<()> {
    if users.find_by_email(DEMO_SCHOOL_ADMIN).await?.is_some() {
        println!("  Demo school already exists, skipping");
        return Ok(());
    }

    let school_id = SchoolId::new();
    let admin = principal(
        DEMO_SCHOOL_ADMIN,
        DEMO_PASSWORD,
        "Demo School Admin",
        Role::SchoolAdmin,
        Some(school_id),
    )?;
    let (school, _) = schools
        .register_school(
            NewSchool {
                id: school_id,
                name: "Demo Public School".to_string(),
                email: DEMO_SCHOOL_EMAIL.to_string(),
            },
            admin,
        )
        .await?;
    println!("  Created school {} with code {:03}", school.name, school.code);

    let login = principal(
        "student1@demo-school.local",
        DEMO_PASSWORD,
        "Asha Verma",
        Role::Student,
        Some(school.id),
    )?;
    let login = schools.insert_principal(login).await?;

    let class = schools
        .insert_class(NewClass {
            id: ClassId::new(),
            school_id: school.id,
            name: "Grade 5".to_string(),
            section: Some("A".to_string()),
        })
        .await?;

    let due_dates = [(2024, 4, 10), (2024, 8, 10), (2024, 12, 10)]
        .into_iter()
        .map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).context("invalid due date"))
        .collect::<Result<Vec<_>>>()?;
    let (class_fee, _) = schools
        .set_class_fee_structure(NewClassFeeStructure {
            id: ClassFeeStructureId::new(),
            school_id: school.id,
            class_id: class.id,
            academic_year: DEMO_ACADEMIC_YEAR.to_string(),
            components: FeeComponents {
                tuition: Money::new(dec!(36000.00)),
                admission: Money::new(dec!(5000.00)),
                development: Money::new(dec!(3000.00)),
                transport: Money::new(dec!(4000.00)),
                library: Money::new(dec!(1000.00)),
                lab: Money::new(dec!(1000.00)),
                ..FeeComponents::default()
            },
            due_dates,
        })
        .await?;
    println!(
        "  Created class {} {} with fee {} for {}",
        class.name,
        class.section.as_deref().unwrap_or_default(),
        class_fee.total_fee.amount(),
        class_fee.academic_year
    );

    let student = schools
        .insert_student(NewStudent {
            id: StudentId::new(),
            school_id: school.id,
            user_id: Some(login.id),
            class_id: Some(class.id),
            admission_no: "ADM-0001".to_string(),
            full_name: "Asha Verma".to_string(),
        })
        .await?;
    println!(
        "  Enrolled {} ({}) into {}",
        student.full_name, student.admission_no, class.name
    );
    Ok(())
}
