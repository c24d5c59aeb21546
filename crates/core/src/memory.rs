//! In-memory implementation of every store trait.
//!
//! One mutex guards all state, so each trait call is atomic the way a
//! database transaction would be. Fault switches let tests exercise the
//! retry and audit-failure paths.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use scholaris_shared::types::{ClassId, SchoolId, StudentId, UserId};
use tokio::sync::Mutex;

use crate::StoreError;
use crate::auth::{AuditLog, AuthEvent, Principal, PrincipalDirectory, Session, SessionStore};
use crate::fees::{
    FeeStatus, FeeStructure, LedgerStore, NotifyError, Payment, PaymentDraft, PaymentError,
    PaymentNotice, PaymentNotifier, Student,
};
use crate::provisioning::{
    ClassFeeStructure, NewClass, NewClassFeeStructure, NewFeeStructure, NewPrincipal, NewSchool,
    NewStudent, ProvisioningStore, School, SchoolClass,
};

#[derive(Debug, Clone)]
struct StudentRow {
    id: StudentId,
    school_id: SchoolId,
    user_id: Option<UserId>,
    class_id: Option<ClassId>,
    admission_no: String,
    full_name: String,
    is_active: bool,
}

#[derive(Default)]
struct State {
    schools: HashMap<SchoolId, School>,
    principals: HashMap<UserId, Principal>,
    sessions: HashMap<String, Session>,
    auth_events: Vec<AuthEvent>,
    students: HashMap<StudentId, StudentRow>,
    classes: HashMap<ClassId, SchoolClass>,
    /// Most recently set last.
    class_fees: Vec<ClassFeeStructure>,
    fee_structures: Vec<FeeStructure>,
    payments: Vec<Payment>,
    counters: HashMap<(SchoolId, NaiveDate), u32>,
}

impl State {
    fn principal(&self, p: &Principal) -> Principal {
        let school_active = p
            .school_id
            .and_then(|id| self.schools.get(&id))
            .is_none_or(|s| s.is_active);
        Principal {
            school_active,
            ..p.clone()
        }
    }

    fn student(&self, row: &StudentRow) -> Option<Student> {
        let school = self.schools.get(&row.school_id)?;
        Some(Student {
            id: row.id,
            school_id: row.school_id,
            school_code: school.code,
            user_id: row.user_id,
            class_id: row.class_id,
            admission_no: row.admission_no.clone(),
            full_name: row.full_name.clone(),
            is_active: row.is_active,
        })
    }

    fn active_structure(&self, student_id: StudentId) -> Option<&FeeStructure> {
        self.fee_structures
            .iter()
            .find(|f| f.student_id == student_id && f.is_active)
    }

    /// Payments booked against any version of the structure's academic year.
    fn counted_payments<'a>(
        &'a self,
        structure: &'a FeeStructure,
    ) -> impl Iterator<Item = &'a Payment> + 'a {
        self.payments.iter().filter(move |p| {
            self.fee_structures.iter().any(|f| {
                f.id == p.fee_structure_id
                    && f.student_id == structure.student_id
                    && f.academic_year == structure.academic_year
            })
        })
    }

    fn assign_fee(&mut self, fee: NewFeeStructure) -> FeeStructure {
        let mut version = 0;
        for existing in self
            .fee_structures
            .iter_mut()
            .filter(|f| f.student_id == fee.student_id)
        {
            version = version.max(existing.version);
            existing.is_active = false;
        }
        let structure = FeeStructure {
            id: fee.id,
            school_id: fee.school_id,
            student_id: fee.student_id,
            academic_year: fee.academic_year,
            total_fee: fee.total_fee,
            due_dates: fee.due_dates,
            class_fee_structure_id: fee.class_fee_structure_id,
            version: version + 1,
            is_active: true,
            created_at: Utc::now(),
        };
        self.fee_structures.push(structure.clone());
        structure
    }

    fn current_class_fee(&self, class_id: ClassId) -> Option<&ClassFeeStructure> {
        self.class_fees.iter().rev().find(|f| f.class_id == class_id)
    }

    fn email_taken(&self, email: &str) -> bool {
        self.principals.values().any(|p| p.email == email)
    }

    fn insert_principal(&mut self, new: NewPrincipal) -> Result<Principal, StoreError> {
        if self.email_taken(&new.email) {
            return Err(StoreError::Conflict("Email already registered".into()));
        }
        let principal = Principal {
            id: new.id,
            email: new.email,
            password_hash: new.password_hash,
            full_name: new.full_name,
            role: new.role,
            school_id: new.school_id,
            is_active: true,
            school_active: true,
        };
        self.principals.insert(principal.id, principal.clone());
        Ok(self.principal(&principal))
    }
}

/// Every store trait over shared in-memory state.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    consistency_failures: AtomicU32,
    audit_down: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes the next `n` payment commits fail with a consistency conflict.
    pub fn fail_next_commits(&self, n: u32) {
        self.consistency_failures.store(n, Ordering::SeqCst);
    }

    /// Makes every audit append fail while `down` is true.
    pub fn set_audit_down(&self, down: bool) {
        self.audit_down.store(down, Ordering::SeqCst);
    }

    /// Snapshot of the audit trail.
    pub async fn auth_events(&self) -> Vec<AuthEvent> {
        self.state.lock().await.auth_events.clone()
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    /// Number of payments of any student.
    pub async fn payment_count(&self) -> usize {
        self.state.lock().await.payments.len()
    }

    /// Inserts a principal directly, bypassing policy. For fixtures.
    pub async fn seed_principal(&self, new: NewPrincipal) -> Result<Principal, StoreError> {
        self.state.lock().await.insert_principal(new)
    }

    /// Flips a school's active flag. For fixtures.
    pub async fn set_school_active(&self, id: SchoolId, active: bool) {
        if let Some(school) = self.state.lock().await.schools.get_mut(&id) {
            school.is_active = active;
        }
    }

    /// Flips a student's active flag. For fixtures.
    pub async fn set_student_active(&self, id: StudentId, active: bool) {
        if let Some(student) = self.state.lock().await.students.get_mut(&id) {
            student.is_active = active;
        }
    }

    fn take_consistency_failure(&self) -> bool {
        self.consistency_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait::async_trait]
impl PrincipalDirectory for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .principals
            .values()
            .find(|p| p.email == email)
            .map(|p| state.principal(p)))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Principal>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.principals.get(&id).map(|p| state.principal(p)))
    }
}

#[async_trait::async_trait]
impl SessionStore for MemoryStore {
    async fn insert(&self, session: &Session) -> Result<(), StoreError> {
        self.state
            .lock()
            .await
            .sessions
            .insert(session.token_hash.clone(), session.clone());
        Ok(())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.state.lock().await.sessions.get(token_hash).cloned())
    }

    async fn touch(&self, token_hash: &str, last_seen_at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(session) = self.state.lock().await.sessions.get_mut(token_hash) {
            session.last_seen_at = last_seen_at;
        }
        Ok(())
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<bool, StoreError> {
        Ok(self.state.lock().await.sessions.remove(token_hash).is_some())
    }

    async fn delete_for_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.user_id != user_id);
        Ok((before - state.sessions.len()) as u64)
    }
}

#[async_trait::async_trait]
impl AuditLog for MemoryStore {
    async fn append(&self, event: &AuthEvent) -> Result<(), StoreError> {
        if self.audit_down.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("audit log unavailable".into()));
        }
        self.state.lock().await.auth_events.push(event.clone());
        Ok(())
    }
}

#[async_trait::async_trait]
impl LedgerStore for MemoryStore {
    async fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.students.get(&id).and_then(|row| state.student(row)))
    }

    async fn active_fee_structure(
        &self,
        student_id: StudentId,
    ) -> Result<Option<FeeStructure>, StoreError> {
        Ok(self.state.lock().await.active_structure(student_id).cloned())
    }

    async fn commit_payment(&self, draft: PaymentDraft) -> Result<Payment, PaymentError> {
        if self.take_consistency_failure() {
            return Err(StoreError::Consistency("simulated serialization failure".into()).into());
        }
        let mut state = self.state.lock().await;
        let key = (draft.school_id, draft.paid_on);
        let next = state.counters.get(&key).copied().unwrap_or(0) + 1;
        let payment = draft.into_payment(next)?;
        if state.payments.iter().any(|p| p.receipt_no == payment.receipt_no) {
            return Err(StoreError::Consistency("duplicate receipt number".into()).into());
        }
        state.counters.insert(key, next);
        state.payments.push(payment.clone());
        Ok(payment)
    }

    async fn payment_history(&self, student_id: StudentId) -> Result<Vec<Payment>, StoreError> {
        let state = self.state.lock().await;
        let mut payments: Vec<Payment> = state
            .payments
            .iter()
            .filter(|p| p.student_id == student_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| {
            b.recorded_at
                .cmp(&a.recorded_at)
                .then_with(|| b.receipt_no.cmp(&a.receipt_no))
        });
        Ok(payments)
    }

    async fn fee_status(&self, student_id: StudentId) -> Result<Option<FeeStatus>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .active_structure(student_id)
            .map(|structure| FeeStatus::compute(structure, state.counted_payments(structure))))
    }

    async fn school_fee_statuses(
        &self,
        school_id: SchoolId,
    ) -> Result<Vec<(Student, FeeStatus)>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .students
            .values()
            .filter(|row| row.school_id == school_id)
            .filter_map(|row| {
                let structure = state.active_structure(row.id)?;
                let status = FeeStatus::compute(structure, state.counted_payments(structure));
                Some((state.student(row)?, status))
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl ProvisioningStore for MemoryStore {
    async fn find_school(&self, id: SchoolId) -> Result<Option<School>, StoreError> {
        Ok(self.state.lock().await.schools.get(&id).cloned())
    }

    async fn register_school(
        &self,
        school: NewSchool,
        admin: NewPrincipal,
    ) -> Result<(School, Principal), StoreError> {
        let mut state = self.state.lock().await;
        if state.email_taken(&admin.email) {
            return Err(StoreError::Conflict("Email already registered".into()));
        }
        let code = state.schools.values().map(|s| s.code).max().unwrap_or(0) + 1;
        let school = School {
            id: school.id,
            code,
            name: school.name,
            email: school.email,
            is_active: true,
            created_at: Utc::now(),
        };
        state.schools.insert(school.id, school.clone());
        let admin = state.insert_principal(admin)?;
        Ok((school, admin))
    }

    async fn insert_principal(&self, principal: NewPrincipal) -> Result<Principal, StoreError> {
        self.state.lock().await.insert_principal(principal)
    }

    async fn set_principal_active(
        &self,
        id: UserId,
        active: bool,
    ) -> Result<Option<u64>, StoreError> {
        let mut state = self.state.lock().await;
        let Some(principal) = state.principals.get_mut(&id) else {
            return Ok(None);
        };
        principal.is_active = active;
        if active {
            return Ok(Some(0));
        }
        let before = state.sessions.len();
        state.sessions.retain(|_, session| session.user_id != id);
        Ok(Some((before - state.sessions.len()) as u64))
    }

    async fn insert_student(&self, new: NewStudent) -> Result<Student, StoreError> {
        let mut state = self.state.lock().await;
        if state
            .students
            .values()
            .any(|s| s.school_id == new.school_id && s.admission_no == new.admission_no)
        {
            return Err(StoreError::Conflict("Admission number already in use".into()));
        }
        let row = StudentRow {
            id: new.id,
            school_id: new.school_id,
            user_id: new.user_id,
            class_id: new.class_id,
            admission_no: new.admission_no,
            full_name: new.full_name,
            is_active: true,
        };
        state.students.insert(row.id, row.clone());
        if let Some(fee) = row
            .class_id
            .and_then(|class_id| state.current_class_fee(class_id))
            .map(|class_fee| class_fee.assignment_for(row.id))
        {
            state.assign_fee(fee);
        }
        state
            .student(&row)
            .ok_or_else(|| StoreError::Backend("student school missing".into()))
    }

    async fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        LedgerStore::find_student(self, id).await
    }

    async fn assign_fee_structure(
        &self,
        fee: NewFeeStructure,
    ) -> Result<FeeStructure, StoreError> {
        Ok(self.state.lock().await.assign_fee(fee))
    }

    async fn insert_class(&self, class: NewClass) -> Result<SchoolClass, StoreError> {
        let mut state = self.state.lock().await;
        if state.classes.values().any(|c| {
            c.school_id == class.school_id && c.name == class.name && c.section == class.section
        }) {
            return Err(StoreError::Conflict("Class already exists".into()));
        }
        let class = SchoolClass {
            id: class.id,
            school_id: class.school_id,
            name: class.name,
            section: class.section,
            created_at: Utc::now(),
        };
        state.classes.insert(class.id, class.clone());
        Ok(class)
    }

    async fn find_class(&self, id: ClassId) -> Result<Option<SchoolClass>, StoreError> {
        Ok(self.state.lock().await.classes.get(&id).cloned())
    }

    async fn set_class_fee_structure(
        &self,
        fee: NewClassFeeStructure,
    ) -> Result<(ClassFeeStructure, u32), StoreError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let existing = state
            .class_fees
            .iter()
            .position(|f| f.class_id == fee.class_id && f.academic_year == fee.academic_year)
            .map(|at| state.class_fees.remove(at));
        let class_fee = ClassFeeStructure {
            id: existing.as_ref().map_or(fee.id, |f| f.id),
            school_id: fee.school_id,
            class_id: fee.class_id,
            academic_year: fee.academic_year,
            total_fee: fee.components.total(),
            components: fee.components,
            due_dates: fee.due_dates,
            created_at: existing.as_ref().map_or(now, |f| f.created_at),
            updated_at: now,
        };
        state.class_fees.push(class_fee.clone());

        let mut members: Vec<StudentId> = state
            .students
            .values()
            .filter(|s| s.class_id == Some(fee.class_id) && s.is_active)
            .map(|s| s.id)
            .collect();
        members.sort_unstable();
        for student_id in &members {
            state.assign_fee(class_fee.assignment_for(*student_id));
        }
        let assigned = u32::try_from(members.len())
            .map_err(|_| StoreError::Backend("class too large".into()))?;
        Ok((class_fee, assigned))
    }
}

/// Notifier that remembers every notice, or fails on demand.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<PaymentNotice>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    /// Creates a notifier that succeeds.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every notification fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Notices received so far.
    pub async fn notices(&self) -> Vec<PaymentNotice> {
        self.notices.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl PaymentNotifier for RecordingNotifier {
    async fn payment_recorded(&self, notice: &PaymentNotice) -> Result<(), NotifyError> {
        self.notices.lock().await.push(notice.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError("gateway unavailable".into()));
        }
        Ok(())
    }
}
