//! In-memory stand-ins for the kernel interfaces. The engines under test run
//! unchanged; only the store, clock and notifier are swapped.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use error_stack::Report;
use time::OffsetDateTime;

use kernel::interface::clock::{DependOnTimeProvider, FixedTimeProvider};
use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::notify::{DependOnLoanNotifier, LoanNotice, LoanNotifier};
use kernel::interface::query::{
    AccountQuery, BorrowRequestQuery, DependOnAccountQuery, DependOnBorrowRequestQuery,
    DependOnEventQuery, DependOnGameQuery, DependOnLendingRecordQuery, DependOnRegistrationQuery,
    EventQuery, GameQuery, LendingRecordFilter, LendingRecordQuery, RegistrationQuery,
};
use kernel::interface::update::{
    AccountModifier, BorrowRequestModifier, DependOnAccountModifier,
    DependOnBorrowRequestModifier, DependOnEventModifier, DependOnGameModifier,
    DependOnLendingRecordModifier, DependOnRegistrationModifier, EventModifier,
    GameModifier, LendingRecordModifier, RegistrationModifier,
};
use kernel::prelude::entity::{
    Account, AccountDraft, AccountId, AccountName, AccountRole, BorrowRequest,
    BorrowRequestDraft, BorrowRequestId, BorrowRequestStatus, ClosedAt, DamageReport, Event,
    EventDraft, EventId, Game, GameDraft, GameId, GameTitle, LendingRecord, LendingRecordDraft,
    LendingRecordId, LendingStatus, Page, PageSelection, Registration, RegistrationDraft,
    RegistrationId,
};
use kernel::KernelError;

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    accounts: BTreeMap<i64, Account>,
    games: BTreeMap<i64, Game>,
    requests: BTreeMap<i64, BorrowRequest>,
    records: BTreeMap<i64, LendingRecord>,
    events: BTreeMap<i64, Event>,
    registrations: BTreeMap<i64, Registration>,
}

impl MemoryState {
    fn assign(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

pub(crate) struct MemoryTransaction(Arc<Mutex<MemoryState>>);

impl MemoryTransaction {
    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.0.lock().expect("memory state poisoned")
    }
}

#[async_trait::async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        Ok(())
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingNotifier {
    sent: Arc<Mutex<Vec<LoanNotice>>>,
    fail: Arc<AtomicBool>,
}

#[async_trait::async_trait]
impl LoanNotifier for RecordingNotifier {
    async fn publish(&self, notice: &LoanNotice) -> error_stack::Result<(), KernelError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Report::new(KernelError::Dependency)
                .attach_printable("notifier unavailable"));
        }
        self.sent
            .lock()
            .expect("notice log poisoned")
            .push(notice.clone());
        Ok(())
    }
}

/// One application module over a shared in-memory store. `at` re-reads the
/// same store under a different fixed clock.
pub(crate) struct TestApp {
    state: Arc<Mutex<MemoryState>>,
    clock: FixedTimeProvider,
    notifier: RecordingNotifier,
}

impl TestApp {
    pub(crate) fn new(now: OffsetDateTime) -> Self {
        Self {
            state: Arc::default(),
            clock: FixedTimeProvider::new(now),
            notifier: RecordingNotifier::default(),
        }
    }

    pub(crate) fn at(&self, now: OffsetDateTime) -> Self {
        Self {
            state: self.state.clone(),
            clock: FixedTimeProvider::new(now),
            notifier: self.notifier.clone(),
        }
    }

    fn seed_account(&self, name: &str, role: AccountRole) -> i64 {
        let mut state = self.state.lock().expect("memory state poisoned");
        let id = state.assign();
        state.accounts.insert(
            id,
            Account::new(AccountId::new(id), AccountName::new(name), role),
        );
        id
    }

    pub(crate) fn seed_owner(&self, name: &str) -> i64 {
        self.seed_account(name, AccountRole::GameOwner)
    }

    pub(crate) fn seed_user(&self, name: &str) -> i64 {
        self.seed_account(name, AccountRole::User)
    }

    pub(crate) fn seed_game(&self, owner_id: i64, title: &str) -> i64 {
        let mut state = self.state.lock().expect("memory state poisoned");
        let id = state.assign();
        state.games.insert(
            id,
            Game::new(GameId::new(id), GameTitle::new(title), AccountId::new(owner_id)),
        );
        id
    }

    pub(crate) fn record_count(&self) -> usize {
        self.state.lock().expect("memory state poisoned").records.len()
    }

    pub(crate) fn notices(&self) -> Vec<LoanNotice> {
        self.notifier.sent.lock().expect("notice log poisoned").clone()
    }

    pub(crate) fn fail_notices(&self) {
        self.notifier.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl DatabaseConnection<MemoryTransaction> for TestApp {
    async fn transact(&self) -> error_stack::Result<MemoryTransaction, KernelError> {
        Ok(MemoryTransaction(self.state.clone()))
    }
}

impl DependOnTimeProvider for TestApp {
    type TimeProvider = FixedTimeProvider;
    fn time_provider(&self) -> &Self::TimeProvider {
        &self.clock
    }
}

impl DependOnLoanNotifier for TestApp {
    type LoanNotifier = RecordingNotifier;
    fn loan_notifier(&self) -> &Self::LoanNotifier {
        &self.notifier
    }
}

pub(crate) struct MemoryRepository;

macro_rules! depend_on_memory_repository {
    ($($depend:ident, $method:ident, $capability:ident;)*) => {
        $(
            impl $depend<MemoryTransaction> for TestApp {
                type $capability = MemoryRepository;
                fn $method(&self) -> &Self::$capability {
                    &MemoryRepository
                }
            }
        )*
    };
}

depend_on_memory_repository! {
    DependOnAccountQuery, account_query, AccountQuery;
    DependOnAccountModifier, account_modifier, AccountModifier;
    DependOnGameQuery, game_query, GameQuery;
    DependOnGameModifier, game_modifier, GameModifier;
    DependOnBorrowRequestQuery, borrow_request_query, BorrowRequestQuery;
    DependOnBorrowRequestModifier, borrow_request_modifier, BorrowRequestModifier;
    DependOnLendingRecordQuery, lending_record_query, LendingRecordQuery;
    DependOnLendingRecordModifier, lending_record_modifier, LendingRecordModifier;
    DependOnEventQuery, event_query, EventQuery;
    DependOnEventModifier, event_modifier, EventModifier;
    DependOnRegistrationQuery, registration_query, RegistrationQuery;
    DependOnRegistrationModifier, registration_modifier, RegistrationModifier;
}

#[async_trait::async_trait]
impl AccountQuery<MemoryTransaction> for MemoryRepository {
    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &AccountId,
    ) -> error_stack::Result<Option<Account>, KernelError> {
        Ok(con.state().accounts.get(id.as_ref()).cloned())
    }
}

#[async_trait::async_trait]
impl AccountModifier<MemoryTransaction> for MemoryRepository {
    async fn create(
        &self,
        con: &mut MemoryTransaction,
        draft: &AccountDraft,
    ) -> error_stack::Result<Account, KernelError> {
        let mut state = con.state();
        let id = state.assign();
        let account = Account::new(
            AccountId::new(id),
            draft.name().clone(),
            *draft.role(),
        );
        state.accounts.insert(id, account.clone());
        Ok(account)
    }
}

#[async_trait::async_trait]
impl GameQuery<MemoryTransaction> for MemoryRepository {
    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &GameId,
    ) -> error_stack::Result<Option<Game>, KernelError> {
        Ok(con.state().games.get(id.as_ref()).cloned())
    }

    async fn find_by_owner(
        &self,
        con: &mut MemoryTransaction,
        owner_id: &AccountId,
    ) -> error_stack::Result<Vec<Game>, KernelError> {
        Ok(con
            .state()
            .games
            .values()
            .filter(|game| game.owner_id() == owner_id)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl GameModifier<MemoryTransaction> for MemoryRepository {
    async fn create(
        &self,
        con: &mut MemoryTransaction,
        draft: &GameDraft,
    ) -> error_stack::Result<Game, KernelError> {
        let mut state = con.state();
        let id = state.assign();
        let game = Game::new(
            GameId::new(id),
            draft.title().clone(),
            draft.owner_id().clone(),
        );
        state.games.insert(id, game.clone());
        Ok(game)
    }
}

#[async_trait::async_trait]
impl BorrowRequestQuery<MemoryTransaction> for MemoryRepository {
    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &BorrowRequestId,
    ) -> error_stack::Result<Option<BorrowRequest>, KernelError> {
        Ok(con.state().requests.get(id.as_ref()).cloned())
    }

    async fn find_by_requester(
        &self,
        con: &mut MemoryTransaction,
        requester_id: &AccountId,
    ) -> error_stack::Result<Vec<BorrowRequest>, KernelError> {
        Ok(con
            .state()
            .requests
            .values()
            .filter(|request| request.requester_id() == requester_id)
            .cloned()
            .collect())
    }

    async fn find_by_status(
        &self,
        con: &mut MemoryTransaction,
        status: &BorrowRequestStatus,
    ) -> error_stack::Result<Vec<BorrowRequest>, KernelError> {
        Ok(con
            .state()
            .requests
            .values()
            .filter(|request| request.status() == status)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl BorrowRequestModifier<MemoryTransaction> for MemoryRepository {
    async fn create(
        &self,
        con: &mut MemoryTransaction,
        draft: &BorrowRequestDraft,
    ) -> error_stack::Result<BorrowRequest, KernelError> {
        let mut state = con.state();
        let id = state.assign();
        let request = BorrowRequest::new(
            BorrowRequestId::new(id),
            draft.requester_id().clone(),
            draft.game_id().clone(),
            draft.period().clone(),
            BorrowRequestStatus::Pending,
            draft.requested_at().clone(),
        );
        state.requests.insert(id, request.clone());
        Ok(request)
    }

    async fn transition_from_pending(
        &self,
        con: &mut MemoryTransaction,
        id: &BorrowRequestId,
        next: &BorrowRequestStatus,
    ) -> error_stack::Result<bool, KernelError> {
        let mut state = con.state();
        let Some(request) = state.requests.get(id.as_ref()) else {
            return Ok(false);
        };
        if !request.status().is_pending() {
            return Ok(false);
        }
        let updated = request.clone().reconstruct(|r| r.status = *next);
        state.requests.insert(*id.as_ref(), updated);
        Ok(true)
    }

    async fn delete_pending(
        &self,
        con: &mut MemoryTransaction,
        id: &BorrowRequestId,
    ) -> error_stack::Result<bool, KernelError> {
        let mut state = con.state();
        let Some(request) = state.requests.get(id.as_ref()) else {
            return Ok(false);
        };
        if !request.status().is_pending() {
            return Ok(false);
        }
        state.requests.remove(id.as_ref());
        Ok(true)
    }
}

#[async_trait::async_trait]
impl LendingRecordQuery<MemoryTransaction> for MemoryRepository {
    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &LendingRecordId,
    ) -> error_stack::Result<Option<LendingRecord>, KernelError> {
        Ok(con.state().records.get(id.as_ref()).cloned())
    }

    async fn find_filtered(
        &self,
        con: &mut MemoryTransaction,
        filter: &LendingRecordFilter,
        selection: &PageSelection,
    ) -> error_stack::Result<Page<LendingRecord>, KernelError> {
        let matches: Vec<LendingRecord> = con
            .state()
            .records
            .values()
            .filter(|record| {
                filter
                    .status
                    .as_ref()
                    .map_or(true, |status| record.status() == status)
                    && filter
                        .owner_id
                        .as_ref()
                        .map_or(true, |owner| record.owner_id() == owner)
                    && filter
                        .borrower_id
                        .as_ref()
                        .map_or(true, |borrower| record.borrower_id() == borrower)
                    && filter
                        .lent_from
                        .as_ref()
                        .map_or(true, |from| record.period().end() >= from)
                    && filter
                        .lent_until
                        .as_ref()
                        .map_or(true, |until| record.period().start() <= until)
            })
            .cloned()
            .collect();
        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(selection.offset() as usize)
            .take(selection.limit() as usize)
            .collect();
        Ok(Page::new(items, total, selection))
    }

    async fn find_overdue(
        &self,
        con: &mut MemoryTransaction,
        now: &OffsetDateTime,
    ) -> error_stack::Result<Vec<LendingRecord>, KernelError> {
        Ok(con
            .state()
            .records
            .values()
            .filter(|record| record.is_overdue(now))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl LendingRecordModifier<MemoryTransaction> for MemoryRepository {
    async fn create(
        &self,
        con: &mut MemoryTransaction,
        draft: &LendingRecordDraft,
    ) -> error_stack::Result<LendingRecord, KernelError> {
        let mut state = con.state();
        let open_exists = state.records.values().any(|record| {
            record.request_id() == draft.request_id() && !record.status().is_closed()
        });
        if open_exists {
            return Err(Report::new(KernelError::Conflict)
                .attach_printable("an open record already exists for this request"));
        }
        let id = state.assign();
        let record = LendingRecord::new(
            LendingRecordId::new(id),
            draft.request_id().clone(),
            draft.game_id().clone(),
            draft.owner_id().clone(),
            draft.borrower_id().clone(),
            draft.period().clone(),
            LendingStatus::Active,
            None,
            None,
        );
        state.records.insert(id, record.clone());
        Ok(record)
    }

    async fn mark_returned(
        &self,
        con: &mut MemoryTransaction,
        id: &LendingRecordId,
    ) -> error_stack::Result<bool, KernelError> {
        let mut state = con.state();
        let Some(record) = state.records.get(id.as_ref()) else {
            return Ok(false);
        };
        if record.status() != &LendingStatus::Active {
            return Ok(false);
        }
        let updated = record
            .clone()
            .reconstruct(|r| r.status = LendingStatus::ReturnPending);
        state.records.insert(*id.as_ref(), updated);
        Ok(true)
    }

    async fn dispute(
        &self,
        con: &mut MemoryTransaction,
        id: &LendingRecordId,
    ) -> error_stack::Result<bool, KernelError> {
        let mut state = con.state();
        let Some(record) = state.records.get(id.as_ref()) else {
            return Ok(false);
        };
        if !record.status().accepts_dispute() {
            return Ok(false);
        }
        let updated = record
            .clone()
            .reconstruct(|r| r.status = LendingStatus::Disputed);
        state.records.insert(*id.as_ref(), updated);
        Ok(true)
    }

    async fn close(
        &self,
        con: &mut MemoryTransaction,
        id: &LendingRecordId,
        damage: &DamageReport,
        closed_at: &ClosedAt,
    ) -> error_stack::Result<bool, KernelError> {
        let mut state = con.state();
        let Some(record) = state.records.get(id.as_ref()) else {
            return Ok(false);
        };
        if record.status().is_closed() {
            return Ok(false);
        }
        let updated = record.clone().reconstruct(|r| {
            r.status = LendingStatus::Closed;
            r.damage = Some(damage.clone());
            r.closed_at = Some(closed_at.clone());
        });
        state.records.insert(*id.as_ref(), updated);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl EventQuery<MemoryTransaction> for MemoryRepository {
    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &EventId,
    ) -> error_stack::Result<Option<Event>, KernelError> {
        Ok(con.state().events.get(id.as_ref()).cloned())
    }

    async fn registered_count(
        &self,
        con: &mut MemoryTransaction,
        id: &EventId,
    ) -> error_stack::Result<i64, KernelError> {
        Ok(con
            .state()
            .registrations
            .values()
            .filter(|registration| registration.event_id() == id)
            .count() as i64)
    }
}

#[async_trait::async_trait]
impl EventModifier<MemoryTransaction> for MemoryRepository {
    async fn create(
        &self,
        con: &mut MemoryTransaction,
        draft: &EventDraft,
    ) -> error_stack::Result<Event, KernelError> {
        let mut state = con.state();
        let id = state.assign();
        let event = Event::new(
            EventId::new(id),
            draft.title().clone(),
            draft.held_at().clone(),
            draft.location().clone(),
            draft.description().clone(),
            draft.capacity().clone(),
            draft.host_id().clone(),
            draft.game_id().clone(),
        );
        state.events.insert(id, event.clone());
        Ok(event)
    }

    async fn revise(
        &self,
        con: &mut MemoryTransaction,
        id: &EventId,
        revision: &kernel::prelude::entity::EventRevision,
    ) -> error_stack::Result<bool, KernelError> {
        let mut state = con.state();
        let Some(event) = state.events.get(id.as_ref()) else {
            return Ok(false);
        };
        if let Some(capacity) = revision.capacity() {
            let registered = state
                .registrations
                .values()
                .filter(|registration| registration.event_id() == id)
                .count() as i64;
            if i64::from(*capacity.as_ref()) < registered {
                return Ok(false);
            }
        }
        let updated = event.clone().reconstruct(|e| {
            if let Some(title) = revision.title() {
                e.title = title.clone();
            }
            if let Some(held_at) = revision.held_at() {
                e.held_at = held_at.clone();
            }
            if let Some(location) = revision.location() {
                e.location = location.clone();
            }
            if let Some(description) = revision.description() {
                e.description = description.clone();
            }
            if let Some(capacity) = revision.capacity() {
                e.capacity = capacity.clone();
            }
        });
        state.events.insert(*id.as_ref(), updated);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl RegistrationQuery<MemoryTransaction> for MemoryRepository {
    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &RegistrationId,
    ) -> error_stack::Result<Option<Registration>, KernelError> {
        Ok(con.state().registrations.get(id.as_ref()).cloned())
    }

    async fn find_by_event(
        &self,
        con: &mut MemoryTransaction,
        event_id: &EventId,
    ) -> error_stack::Result<Vec<Registration>, KernelError> {
        Ok(con
            .state()
            .registrations
            .values()
            .filter(|registration| registration.event_id() == event_id)
            .cloned()
            .collect())
    }

    async fn find_by_event_and_attendee(
        &self,
        con: &mut MemoryTransaction,
        event_id: &EventId,
        attendee_id: &AccountId,
    ) -> error_stack::Result<Option<Registration>, KernelError> {
        Ok(con
            .state()
            .registrations
            .values()
            .find(|registration| {
                registration.event_id() == event_id && registration.attendee_id() == attendee_id
            })
            .cloned())
    }
}

#[async_trait::async_trait]
impl RegistrationModifier<MemoryTransaction> for MemoryRepository {
    async fn create_within_capacity(
        &self,
        con: &mut MemoryTransaction,
        draft: &RegistrationDraft,
    ) -> error_stack::Result<Option<Registration>, KernelError> {
        let mut state = con.state();
        let capacity = match state.events.get(draft.event_id().as_ref()) {
            Some(event) => i64::from(*event.capacity().as_ref()),
            None => {
                return Err(Report::new(KernelError::NotFound)
                    .attach_printable("event to register for does not exist"));
            }
        };
        let registered = state
            .registrations
            .values()
            .filter(|registration| registration.event_id() == draft.event_id())
            .count() as i64;
        if registered >= capacity {
            return Ok(None);
        }
        let duplicate = state.registrations.values().any(|registration| {
            registration.event_id() == draft.event_id()
                && registration.attendee_id() == draft.attendee_id()
        });
        if duplicate {
            return Err(Report::new(KernelError::Conflict)
                .attach_printable("attendee already holds a registration for this event"));
        }
        let id = state.assign();
        let registration = Registration::new(
            RegistrationId::new(id),
            draft.event_id().clone(),
            draft.attendee_id().clone(),
            draft.registered_at().clone(),
        );
        state.registrations.insert(id, registration.clone());
        Ok(Some(registration))
    }

    async fn delete(
        &self,
        con: &mut MemoryTransaction,
        id: &RegistrationId,
    ) -> error_stack::Result<bool, KernelError> {
        Ok(con.state().registrations.remove(id.as_ref()).is_some())
    }
}
