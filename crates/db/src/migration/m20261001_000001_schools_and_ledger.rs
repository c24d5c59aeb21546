//! Schools, principals, students, fee structures and the payment ledger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(SCHOOLS_USERS_SQL).await?;
        db.execute_unprepared(STUDENTS_FEES_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP TABLE IF EXISTS receipt_counters CASCADE;
DROP TABLE IF EXISTS student_fee_status CASCADE;
DROP TABLE IF EXISTS payment_events CASCADE;
DROP TABLE IF EXISTS payments CASCADE;
DROP FUNCTION IF EXISTS reject_payment_mutation();
DROP TABLE IF EXISTS fee_structures CASCADE;
DROP TABLE IF EXISTS students CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TABLE IF EXISTS schools CASCADE;
DROP TYPE IF EXISTS payment_mode;
DROP TYPE IF EXISTS user_role;
",
        )
        .await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM ('super_admin', 'school_admin', 'teacher', 'student');
CREATE TYPE payment_mode AS ENUM ('cash', 'online', 'cheque', 'bank_transfer');
";

const SCHOOLS_USERS_SQL: &str = r"
-- Receipt numbers carry the code in three digits
CREATE TABLE schools (
    id UUID PRIMARY KEY,
    code INTEGER GENERATED BY DEFAULT AS IDENTITY (MINVALUE 1 MAXVALUE 999 NO CYCLE) UNIQUE,
    name VARCHAR(200) NOT NULL,
    email VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_school_code CHECK (code BETWEEN 1 AND 999)
);

CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR(255) NOT NULL,
    password_hash TEXT NOT NULL,
    full_name VARCHAR(200) NOT NULL,
    role user_role NOT NULL,
    school_id UUID REFERENCES schools(id) ON DELETE RESTRICT,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_users_email UNIQUE (email),
    CONSTRAINT chk_email_lowercase CHECK (email = lower(email)),
    CONSTRAINT chk_school_scope CHECK ((role = 'super_admin') = (school_id IS NULL))
);

CREATE INDEX idx_users_school ON users(school_id);
";

const STUDENTS_FEES_SQL: &str = r"
CREATE TABLE students (
    id UUID PRIMARY KEY,
    school_id UUID NOT NULL REFERENCES schools(id) ON DELETE RESTRICT,
    user_id UUID REFERENCES users(id) ON DELETE SET NULL,
    admission_no VARCHAR(50) NOT NULL,
    full_name VARCHAR(200) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_students_admission UNIQUE (school_id, admission_no)
);

CREATE UNIQUE INDEX uq_students_user ON students(user_id) WHERE user_id IS NOT NULL;

CREATE TABLE fee_structures (
    id UUID PRIMARY KEY,
    school_id UUID NOT NULL REFERENCES schools(id) ON DELETE RESTRICT,
    student_id UUID NOT NULL REFERENCES students(id) ON DELETE RESTRICT,
    academic_year VARCHAR(20) NOT NULL,
    total_fee NUMERIC(12, 2) NOT NULL,
    version INTEGER NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_total_fee_positive CHECK (total_fee > 0),
    CONSTRAINT uq_fee_structure_version UNIQUE (student_id, version)
);

-- At most one active structure per student
CREATE UNIQUE INDEX uq_fee_structures_active ON fee_structures(student_id) WHERE is_active;
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    school_id UUID NOT NULL REFERENCES schools(id) ON DELETE RESTRICT,
    student_id UUID NOT NULL REFERENCES students(id) ON DELETE RESTRICT,
    fee_structure_id UUID NOT NULL REFERENCES fee_structures(id) ON DELETE RESTRICT,
    receipt_no CHAR(18) NOT NULL,
    amount NUMERIC(12, 2) NOT NULL,
    mode payment_mode NOT NULL,
    reference VARCHAR(100),
    remarks VARCHAR(500),
    paid_on DATE NOT NULL,
    recorded_by UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    recorded_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_payments_receipt_no UNIQUE (receipt_no),
    CONSTRAINT chk_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_payments_student ON payments(student_id, recorded_at DESC);

CREATE FUNCTION reject_payment_mutation() RETURNS trigger AS $$
BEGIN
    RAISE EXCEPTION 'payments are immutable';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_payments_immutable
    BEFORE UPDATE OR DELETE ON payments
    FOR EACH ROW EXECUTE FUNCTION reject_payment_mutation();

CREATE TABLE payment_events (
    id UUID PRIMARY KEY,
    payment_id UUID NOT NULL REFERENCES payments(id) ON DELETE RESTRICT,
    action VARCHAR(30) NOT NULL,
    amount NUMERIC(12, 2) NOT NULL,
    actor_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    occurred_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_payment_events_payment ON payment_events(payment_id);

CREATE TABLE student_fee_status (
    student_id UUID PRIMARY KEY REFERENCES students(id) ON DELETE CASCADE,
    fee_structure_id UUID NOT NULL REFERENCES fee_structures(id) ON DELETE RESTRICT,
    total_fee NUMERIC(12, 2) NOT NULL,
    paid_amount NUMERIC(12, 2) NOT NULL DEFAULT 0,
    last_payment_date DATE,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE receipt_counters (
    school_id UUID NOT NULL REFERENCES schools(id) ON DELETE RESTRICT,
    day DATE NOT NULL,
    last_value INTEGER NOT NULL,
    PRIMARY KEY (school_id, day),
    CONSTRAINT chk_counter_positive CHECK (last_value > 0)
);
";
