use error_stack::Report;

use kernel::interface::authorize::{ensure_transition, GuardedResource, TransitionAction};
use kernel::interface::clock::{DependOnTimeProvider, TimeProvider};
use kernel::interface::database::{
    DatabaseConnection, DependOnDatabaseConnection, Transaction,
};
use kernel::interface::notify::{DependOnLoanNotifier, LoanNotice, LoanNotifier};
use kernel::interface::query::{
    DependOnAccountQuery, DependOnLendingRecordQuery, LendingRecordFilter, LendingRecordQuery,
};
use kernel::interface::update::{DependOnLendingRecordModifier, LendingRecordModifier};
use kernel::prelude::entity::{
    AccountId, ClosedAt, DamageReport, LendingRecord, LendingRecordId, LendingStatus, PageNumber,
    PageSelection, PageSize,
};
use kernel::KernelError;

use crate::service::resolve_account;
use crate::transfer::{
    CloseRecordDto, GetLendingRecordDto, LendingRecordDto, ListLendingRecordsDto, PageDto,
    RecordActionDto,
};

#[async_trait::async_trait]
pub trait HandleLendingRecordService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnAccountQuery<Connection>
    + DependOnLendingRecordQuery<Connection>
    + DependOnLendingRecordModifier<Connection>
    + DependOnTimeProvider
    + DependOnLoanNotifier
{
    /// Borrower reports the game back: ACTIVE -> RETURN_PENDING. The owner
    /// then confirms through `close_record` or contests through
    /// `raise_dispute`.
    async fn mark_returned(
        &self,
        dto: RecordActionDto,
    ) -> error_stack::Result<LendingRecordDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let record = self
            .fetch_guarded(&mut connection, dto.record_id, dto.acting_account_id, TransitionAction::MarkReturned)
            .await?;

        let moved = self
            .lending_record_modifier()
            .mark_returned(&mut connection, record.id())
            .await?;
        if !moved {
            return Err(Report::new(KernelError::Conflict)
                .attach_printable("only an active loan can be marked returned"));
        }
        connection.commit().await?;

        let notice = LoanNotice::ReturnMarked {
            record_id: record.id().clone(),
        };
        if let Err(report) = self.loan_notifier().publish(&notice).await {
            tracing::warn!("return notice failed, transition stands: {report:?}");
        }

        let record = record.reconstruct(|r| r.status = LendingStatus::ReturnPending);
        let now = self.time_provider().now();
        Ok(LendingRecordDto::project(record, &now))
    }

    /// Either party contests the loan: ACTIVE | RETURN_PENDING -> DISPUTED.
    async fn raise_dispute(
        &self,
        dto: RecordActionDto,
    ) -> error_stack::Result<LendingRecordDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let record = self
            .fetch_guarded(&mut connection, dto.record_id, dto.acting_account_id, TransitionAction::RaiseDispute)
            .await?;

        let moved = self
            .lending_record_modifier()
            .dispute(&mut connection, record.id())
            .await?;
        if !moved {
            return Err(Report::new(KernelError::Conflict)
                .attach_printable("a dispute can no longer be raised on this record"));
        }
        connection.commit().await?;

        let notice = LoanNotice::DisputeRaised {
            record_id: record.id().clone(),
        };
        if let Err(report) = self.loan_notifier().publish(&notice).await {
            tracing::warn!("dispute notice failed, transition stands: {report:?}");
        }

        let record = record.reconstruct(|r| r.status = LendingStatus::Disputed);
        let now = self.time_provider().now();
        Ok(LendingRecordDto::project(record, &now))
    }

    /// Owner confirms the return and seals the record with its damage
    /// assessment. Exactly one close ever succeeds; every later attempt
    /// conflicts.
    async fn close_record(
        &self,
        dto: CloseRecordDto,
    ) -> error_stack::Result<LendingRecordDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let record = self
            .fetch_guarded(&mut connection, dto.record_id, dto.acting_account_id, TransitionAction::CloseRecord)
            .await?;

        let damage = DamageReport::new(dto.damaged, dto.damage_notes);
        let closed_at = ClosedAt::new(self.time_provider().now());
        let sealed = self
            .lending_record_modifier()
            .close(&mut connection, record.id(), &damage, &closed_at)
            .await?;
        if !sealed {
            return Err(
                Report::new(KernelError::Conflict).attach_printable("record is already closed")
            );
        }
        connection.commit().await?;

        let notice = LoanNotice::RecordClosed {
            record_id: record.id().clone(),
            damaged: *damage.flagged(),
        };
        if let Err(report) = self.loan_notifier().publish(&notice).await {
            tracing::warn!("close notice failed, transition stands: {report:?}");
        }

        let record = record.reconstruct(|r| {
            r.status = LendingStatus::Closed;
            r.damage = Some(damage);
            r.closed_at = Some(closed_at);
        });
        let now = self.time_provider().now();
        Ok(LendingRecordDto::project(record, &now))
    }

    /// Shared prologue: resolve record and principal, then gate the action.
    async fn fetch_guarded(
        &self,
        connection: &mut Connection,
        record_id: i64,
        acting_account_id: i64,
        action: TransitionAction,
    ) -> error_stack::Result<LendingRecord, KernelError> {
        let record = self
            .lending_record_query()
            .find_by_id(connection, &LendingRecordId::new(record_id))
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable("lending record does not exist")
            })?;
        let principal = resolve_account(
            self.account_query(),
            connection,
            acting_account_id,
            "acting",
        )
        .await?;
        ensure_transition(
            &principal,
            GuardedResource::Record {
                owner: record.owner_id(),
                borrower: record.borrower_id(),
            },
            action,
        )?;
        Ok(record)
    }
}

impl<Connection: Transaction + Send, T> HandleLendingRecordService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnAccountQuery<Connection>
        + DependOnLendingRecordQuery<Connection>
        + DependOnLendingRecordModifier<Connection>
        + DependOnTimeProvider
        + DependOnLoanNotifier
{
}

#[async_trait::async_trait]
pub trait GetLendingRecordService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnLendingRecordQuery<Connection>
    + DependOnTimeProvider
{
    async fn get_record(
        &self,
        dto: GetLendingRecordDto,
    ) -> error_stack::Result<Option<LendingRecordDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let record = self
            .lending_record_query()
            .find_by_id(&mut connection, &LendingRecordId::new(dto.id))
            .await?;
        let now = self.time_provider().now();
        Ok(record.map(|record| LendingRecordDto::project(record, &now)))
    }

    async fn list_records(
        &self,
        dto: ListLendingRecordsDto,
    ) -> error_stack::Result<PageDto<LendingRecordDto>, KernelError> {
        let selection = PageSelection::new(
            PageNumber::new(dto.page.unwrap_or(1)),
            PageSize::new(dto.size.unwrap_or_else(|| *PageSize::default().as_ref())),
        )?;
        let filter = LendingRecordFilter {
            status: dto.status,
            owner_id: dto.owner_id.map(AccountId::new),
            borrower_id: dto.borrower_id.map(AccountId::new),
            lent_from: dto.lent_from,
            lent_until: dto.lent_until,
        };
        let mut connection = self.database_connection().transact().await?;

        let page = self
            .lending_record_query()
            .find_filtered(&mut connection, &filter, &selection)
            .await?;
        let now = self.time_provider().now();
        Ok(PageDto::project(page, &now))
    }

    /// Enumerates records that read as OVERDUE right now, straight from the
    /// stored end dates.
    async fn overdue_records(&self) -> error_stack::Result<Vec<LendingRecordDto>, KernelError> {
        let now = self.time_provider().now();
        let mut connection = self.database_connection().transact().await?;

        let records = self
            .lending_record_query()
            .find_overdue(&mut connection, &now)
            .await?;
        Ok(records
            .into_iter()
            .map(|record| LendingRecordDto::project(record, &now))
            .collect())
    }
}

impl<Connection: Transaction + Send, T> GetLendingRecordService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnLendingRecordQuery<Connection>
        + DependOnTimeProvider
{
}

#[cfg(test)]
mod test {
    use time::macros::datetime;

    use kernel::prelude::entity::LendingStatus;
    use kernel::KernelError;

    use crate::service::{
        CreateBorrowRequestService, GetLendingRecordService, HandleBorrowRequestService,
        HandleLendingRecordService,
    };
    use crate::testing::TestApp;
    use crate::transfer::{
        BorrowRequestActionDto, CloseRecordDto, CreateBorrowRequestDto, GetLendingRecordDto,
        ListLendingRecordsDto, RecordActionDto,
    };

    struct Loan {
        owner: i64,
        borrower: i64,
        record_id: i64,
    }

    /// Runs a request through approval: loan of Everdell from Orla to Una,
    /// 2024-01-01 to 2024-01-07.
    async fn approved_loan(app: &TestApp) -> Loan {
        let owner = app.seed_owner("Orla");
        let borrower = app.seed_user("Una");
        let game = app.seed_game(owner, "Everdell");
        let request = app
            .create_request(CreateBorrowRequestDto {
                requester_id: borrower,
                game_id: game,
                start_date: datetime!(2024-01-01 00:00 UTC),
                end_date: datetime!(2024-01-07 00:00 UTC),
            })
            .await
            .unwrap();
        let record = app
            .approve(BorrowRequestActionDto {
                request_id: request.id,
                acting_account_id: owner,
            })
            .await
            .unwrap();
        Loan {
            owner,
            borrower,
            record_id: record.id,
        }
    }

    #[tokio::test]
    async fn overdue_listing_follows_the_clock() {
        let app = TestApp::new(datetime!(2024-01-02 00:00 UTC));
        let loan = approved_loan(&app).await;

        // before the end date nothing is overdue
        assert!(app.overdue_records().await.unwrap().is_empty());

        // same stored state read three days past the end date
        let later = app.at(datetime!(2024-01-10 00:00 UTC));
        let overdue = later.overdue_records().await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, loan.record_id);
        assert_eq!(overdue[0].status, "OVERDUE");

        // the stored status never moved
        let stored = later
            .get_record(GetLendingRecordDto { id: loan.record_id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, "OVERDUE");
        assert!(app
            .get_record(GetLendingRecordDto { id: loan.record_id })
            .await
            .unwrap()
            .unwrap()
            .status
            .eq("ACTIVE"));
    }

    #[tokio::test]
    async fn close_seals_once_and_conflicts_after() {
        let app = TestApp::new(datetime!(2024-01-10 00:00 UTC));
        let loan = approved_loan(&app).await;

        let closed = app
            .close_record(CloseRecordDto {
                record_id: loan.record_id,
                acting_account_id: loan.owner,
                damaged: false,
                damage_notes: None,
            })
            .await
            .unwrap();
        assert_eq!(closed.status, "CLOSED");
        assert_eq!(closed.closed_at, Some(datetime!(2024-01-10 00:00 UTC)));
        assert_eq!(closed.damaged, Some(false));

        let again = app
            .close_record(CloseRecordDto {
                record_id: loan.record_id,
                acting_account_id: loan.owner,
                damaged: true,
                damage_notes: Some("missing meeples".to_string()),
            })
            .await
            .expect_err("second close must conflict");
        assert!(matches!(again.current_context(), KernelError::Conflict));

        // first close's assessment stands
        let stored = app
            .get_record(GetLendingRecordDto { id: loan.record_id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.damaged, Some(false));
        assert_eq!(stored.damage_notes, None);
    }

    #[tokio::test]
    async fn non_owner_close_is_forbidden_whatever_the_state() {
        let app = TestApp::new(datetime!(2024-01-10 00:00 UTC));
        let loan = approved_loan(&app).await;
        let stranger = app.seed_user("Beck");

        for principal in [loan.borrower, stranger] {
            let denied = app
                .close_record(CloseRecordDto {
                    record_id: loan.record_id,
                    acting_account_id: principal,
                    damaged: false,
                    damage_notes: None,
                })
                .await
                .expect_err("only the owner may close");
            assert!(matches!(denied.current_context(), KernelError::Forbidden));
        }

        // still closable by the owner afterwards
        app.close_record(CloseRecordDto {
            record_id: loan.record_id,
            acting_account_id: loan.owner,
            damaged: false,
            damage_notes: None,
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn return_flow_runs_borrower_then_owner() {
        let app = TestApp::new(datetime!(2024-01-06 00:00 UTC));
        let loan = approved_loan(&app).await;

        // the owner cannot report the return on the borrower's behalf
        let denied = app
            .mark_returned(RecordActionDto {
                record_id: loan.record_id,
                acting_account_id: loan.owner,
            })
            .await
            .expect_err("owner cannot mark returned");
        assert!(matches!(denied.current_context(), KernelError::Forbidden));

        let pending = app
            .mark_returned(RecordActionDto {
                record_id: loan.record_id,
                acting_account_id: loan.borrower,
            })
            .await
            .unwrap();
        assert_eq!(pending.status, "RETURN_PENDING");

        // marking twice conflicts
        let twice = app
            .mark_returned(RecordActionDto {
                record_id: loan.record_id,
                acting_account_id: loan.borrower,
            })
            .await
            .expect_err("record is no longer active");
        assert!(matches!(twice.current_context(), KernelError::Conflict));

        let closed = app
            .close_record(CloseRecordDto {
                record_id: loan.record_id,
                acting_account_id: loan.owner,
                damaged: false,
                damage_notes: None,
            })
            .await
            .unwrap();
        assert_eq!(closed.status, "CLOSED");
    }

    #[tokio::test]
    async fn disputes_come_from_either_party_and_resolve_by_close() {
        let app = TestApp::new(datetime!(2024-01-06 00:00 UTC));
        let loan = approved_loan(&app).await;

        let disputed = app
            .raise_dispute(RecordActionDto {
                record_id: loan.record_id,
                acting_account_id: loan.borrower,
            })
            .await
            .unwrap();
        assert_eq!(disputed.status, "DISPUTED");

        // no return report while disputed
        let blocked = app
            .mark_returned(RecordActionDto {
                record_id: loan.record_id,
                acting_account_id: loan.borrower,
            })
            .await
            .expect_err("disputed record is not active");
        assert!(matches!(blocked.current_context(), KernelError::Conflict));

        // second dispute conflicts too
        let again = app
            .raise_dispute(RecordActionDto {
                record_id: loan.record_id,
                acting_account_id: loan.owner,
            })
            .await
            .expect_err("dispute already raised");
        assert!(matches!(again.current_context(), KernelError::Conflict));

        // the owner's close settles it, with the assessment on file
        let closed = app
            .close_record(CloseRecordDto {
                record_id: loan.record_id,
                acting_account_id: loan.owner,
                damaged: true,
                damage_notes: Some("lid cracked".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(closed.status, "CLOSED");
        assert_eq!(closed.damaged, Some(true));
        assert_eq!(closed.damage_notes, Some("lid cracked".to_string()));
    }

    #[tokio::test]
    async fn committed_close_survives_a_failing_notifier() {
        let app = TestApp::new(datetime!(2024-01-10 00:00 UTC));
        let loan = approved_loan(&app).await;
        app.fail_notices();

        let closed = app
            .close_record(CloseRecordDto {
                record_id: loan.record_id,
                acting_account_id: loan.owner,
                damaged: false,
                damage_notes: None,
            })
            .await
            .expect("close succeeds although the notice cannot be delivered");
        assert_eq!(closed.status, "CLOSED");

        let stored = app
            .get_record(GetLendingRecordDto { id: loan.record_id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, "CLOSED");
    }

    #[tokio::test]
    async fn listing_composes_filters_and_paginates() {
        let app = TestApp::new(datetime!(2024-01-02 00:00 UTC));
        let loan = approved_loan(&app).await;

        // another borrower, another loan of a second game
        let other = app.seed_user("Beck");
        let game = app.seed_game(loan.owner, "Cascadia");
        let request = app
            .create_request(CreateBorrowRequestDto {
                requester_id: other,
                game_id: game,
                start_date: datetime!(2024-02-01 00:00 UTC),
                end_date: datetime!(2024-02-07 00:00 UTC),
            })
            .await
            .unwrap();
        app.approve(BorrowRequestActionDto {
            request_id: request.id,
            acting_account_id: loan.owner,
        })
        .await
        .unwrap();

        let by_owner = app
            .list_records(ListLendingRecordsDto {
                owner_id: Some(loan.owner),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_owner.total_items, 2);

        let by_borrower = app
            .list_records(ListLendingRecordsDto {
                owner_id: Some(loan.owner),
                borrower_id: Some(loan.borrower),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_borrower.total_items, 1);
        assert_eq!(by_borrower.items[0].id, loan.record_id);

        let by_status = app
            .list_records(ListLendingRecordsDto {
                status: Some(LendingStatus::Active),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_status.total_items, 2);

        // inclusive overlap with january only
        let january = app
            .list_records(ListLendingRecordsDto {
                lent_from: Some(datetime!(2024-01-01 00:00 UTC)),
                lent_until: Some(datetime!(2024-01-31 00:00 UTC)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(january.total_items, 1);

        // one record per page
        let paged = app
            .list_records(ListLendingRecordsDto {
                page: Some(2),
                size: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(paged.total_items, 2);
        assert_eq!(paged.total_pages, 2);
        assert_eq!(paged.page, 2);
        assert_eq!(paged.items.len(), 1);

        let bad_page = app
            .list_records(ListLendingRecordsDto {
                page: Some(0),
                ..Default::default()
            })
            .await
            .expect_err("page 0 is invalid");
        assert!(matches!(bad_page.current_context(), KernelError::Validation));
    }
}
