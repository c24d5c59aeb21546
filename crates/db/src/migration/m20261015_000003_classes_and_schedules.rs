//! Classes, class fee breakdowns and installment due dates.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(CLASSES_SQL).await?;
        db.execute_unprepared(CLASS_FEE_STRUCTURES_SQL).await?;
        db.execute_unprepared(LINKS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DOWN_SQL).await?;
        Ok(())
    }
}

const DOWN_SQL: &str = r"
ALTER TABLE student_fee_status ALTER COLUMN paid_amount TYPE NUMERIC(12, 2);
ALTER TABLE fee_structures DROP COLUMN IF EXISTS due_dates;
ALTER TABLE fee_structures DROP COLUMN IF EXISTS class_fee_structure_id;
ALTER TABLE students DROP COLUMN IF EXISTS class_id;
DROP TABLE IF EXISTS class_fee_structures CASCADE;
DROP TABLE IF EXISTS classes CASCADE;
";

const CLASSES_SQL: &str = r"
CREATE TABLE classes (
    id UUID PRIMARY KEY,
    school_id UUID NOT NULL REFERENCES schools(id) ON DELETE RESTRICT,
    name VARCHAR(50) NOT NULL,
    section VARCHAR(10),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- A missing section counts as one value
CREATE UNIQUE INDEX uq_classes_name ON classes(school_id, name, COALESCE(section, ''));
";

const CLASS_FEE_STRUCTURES_SQL: &str = r"
CREATE TABLE class_fee_structures (
    id UUID PRIMARY KEY,
    school_id UUID NOT NULL REFERENCES schools(id) ON DELETE RESTRICT,
    class_id UUID NOT NULL REFERENCES classes(id) ON DELETE RESTRICT,
    academic_year VARCHAR(20) NOT NULL,
    tuition_fee NUMERIC(12, 2) NOT NULL DEFAULT 0,
    admission_fee NUMERIC(12, 2) NOT NULL DEFAULT 0,
    development_fee NUMERIC(12, 2) NOT NULL DEFAULT 0,
    transport_fee NUMERIC(12, 2) NOT NULL DEFAULT 0,
    library_fee NUMERIC(12, 2) NOT NULL DEFAULT 0,
    lab_fee NUMERIC(12, 2) NOT NULL DEFAULT 0,
    sports_fee NUMERIC(12, 2) NOT NULL DEFAULT 0,
    other_fee NUMERIC(12, 2) NOT NULL DEFAULT 0,
    total_fee NUMERIC(12, 2) NOT NULL,
    due_dates JSONB NOT NULL DEFAULT '[]',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_class_fee_structures_year UNIQUE (class_id, academic_year),
    CONSTRAINT chk_class_fee_components CHECK (
        tuition_fee >= 0 AND admission_fee >= 0 AND development_fee >= 0
        AND transport_fee >= 0 AND library_fee >= 0 AND lab_fee >= 0
        AND sports_fee >= 0 AND other_fee >= 0
    ),
    CONSTRAINT chk_class_fee_total CHECK (total_fee > 0)
);

CREATE INDEX idx_class_fee_structures_latest ON class_fee_structures(class_id, updated_at DESC);
";

const LINKS_SQL: &str = r"
ALTER TABLE students ADD COLUMN class_id UUID REFERENCES classes(id) ON DELETE SET NULL;
CREATE INDEX idx_students_class ON students(class_id) WHERE is_active;

ALTER TABLE fee_structures
    ADD COLUMN class_fee_structure_id UUID REFERENCES class_fee_structures(id) ON DELETE SET NULL,
    ADD COLUMN due_dates JSONB NOT NULL DEFAULT '[]';

-- Overpayments may push the running total past a single amount's range
ALTER TABLE student_fee_status ALTER COLUMN paid_amount TYPE NUMERIC(18, 2);
";
