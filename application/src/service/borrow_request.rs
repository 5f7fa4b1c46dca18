use error_stack::Report;

use kernel::interface::authorize::{ensure_transition, GuardedResource, TransitionAction};
use kernel::interface::clock::{DependOnTimeProvider, TimeProvider};
use kernel::interface::database::{
    DatabaseConnection, DependOnDatabaseConnection, Transaction,
};
use kernel::interface::notify::{DependOnLoanNotifier, LoanNotice, LoanNotifier};
use kernel::interface::query::{
    BorrowRequestQuery, DependOnAccountQuery, DependOnBorrowRequestQuery, DependOnGameQuery,
    GameQuery,
};
use kernel::interface::update::{
    BorrowRequestModifier, DependOnBorrowRequestModifier, DependOnLendingRecordModifier,
    LendingRecordModifier,
};
use kernel::prelude::entity::{
    AccountId, BorrowRequest, BorrowRequestDraft, BorrowRequestId, BorrowRequestStatus,
    CreatedAt, Game, GameId, LendingRecordDraft, LoanPeriod,
};
use kernel::KernelError;

use crate::service::resolve_account;
use crate::transfer::{
    BorrowRequestActionDto, BorrowRequestDto, CreateBorrowRequestDto, GetBorrowRequestDto,
    GetRequestsByRequesterDto, GetRequestsByStatusDto, LendingRecordDto,
};

#[async_trait::async_trait]
pub trait CreateBorrowRequestService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnAccountQuery<Connection>
    + DependOnGameQuery<Connection>
    + DependOnBorrowRequestModifier<Connection>
    + DependOnTimeProvider
{
    async fn create_request(
        &self,
        dto: CreateBorrowRequestDto,
    ) -> error_stack::Result<BorrowRequestDto, KernelError> {
        let period = LoanPeriod::new(dto.start_date, dto.end_date)?;
        let mut connection = self.database_connection().transact().await?;

        let requester = resolve_account(
            self.account_query(),
            &mut connection,
            dto.requester_id,
            "requester",
        )
        .await?;
        let game = self
            .game_query()
            .find_by_id(&mut connection, &GameId::new(dto.game_id))
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable("requested game does not exist")
            })?;

        let draft = BorrowRequestDraft::new(
            requester.id().clone(),
            game.id().clone(),
            period,
            CreatedAt::new(self.time_provider().now()),
        );
        let request = self
            .borrow_request_modifier()
            .create(&mut connection, &draft)
            .await?;
        connection.commit().await?;

        Ok(BorrowRequestDto::from(request))
    }
}

impl<Connection: Transaction + Send, T> CreateBorrowRequestService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnAccountQuery<Connection>
        + DependOnGameQuery<Connection>
        + DependOnBorrowRequestModifier<Connection>
        + DependOnTimeProvider
{
}

#[async_trait::async_trait]
pub trait HandleBorrowRequestService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnAccountQuery<Connection>
    + DependOnGameQuery<Connection>
    + DependOnBorrowRequestQuery<Connection>
    + DependOnBorrowRequestModifier<Connection>
    + DependOnLendingRecordModifier<Connection>
    + DependOnTimeProvider
    + DependOnLoanNotifier
{
    /// PENDING -> APPROVED, then the lending record is created in the same
    /// transaction. The compare-and-set plus the open-record uniqueness
    /// guarantee the record is created exactly once per request.
    async fn approve(
        &self,
        dto: BorrowRequestActionDto,
    ) -> error_stack::Result<LendingRecordDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let (request, game) = self.guard(&mut connection, &dto, TransitionAction::ApproveRequest).await?;
        let request_id = request.id().clone();

        let settled = self
            .borrow_request_modifier()
            .transition_from_pending(&mut connection, &request_id, &BorrowRequestStatus::Approved)
            .await?;
        if !settled {
            return Err(Report::new(KernelError::Conflict)
                .attach_printable("borrow request is no longer pending"));
        }

        let draft = LendingRecordDraft::new(
            request_id.clone(),
            game.id().clone(),
            game.owner_id().clone(),
            request.requester_id().clone(),
            request.period().clone(),
        );
        let record = self
            .lending_record_modifier()
            .create(&mut connection, &draft)
            .await?;
        connection.commit().await?;

        let notice = LoanNotice::RequestApproved {
            request_id,
            record_id: record.id().clone(),
        };
        if let Err(report) = self.loan_notifier().publish(&notice).await {
            tracing::warn!("approval notice failed, transition stands: {report:?}");
        }

        let now = self.time_provider().now();
        Ok(LendingRecordDto::project(record, &now))
    }

    /// PENDING -> DECLINED.
    async fn decline(
        &self,
        dto: BorrowRequestActionDto,
    ) -> error_stack::Result<BorrowRequestDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let (request, _) = self.guard(&mut connection, &dto, TransitionAction::DeclineRequest).await?;
        let request_id = request.id().clone();

        let settled = self
            .borrow_request_modifier()
            .transition_from_pending(&mut connection, &request_id, &BorrowRequestStatus::Declined)
            .await?;
        if !settled {
            return Err(Report::new(KernelError::Conflict)
                .attach_printable("borrow request is no longer pending"));
        }
        connection.commit().await?;

        let notice = LoanNotice::RequestDeclined { request_id };
        if let Err(report) = self.loan_notifier().publish(&notice).await {
            tracing::warn!("decline notice failed, transition stands: {report:?}");
        }

        let request = request.reconstruct(|r| r.status = BorrowRequestStatus::Declined);
        Ok(BorrowRequestDto::from(request))
    }

    /// Removes a still-PENDING request on behalf of its requester.
    async fn withdraw(
        &self,
        dto: BorrowRequestActionDto,
    ) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let (request, _) = self.guard(&mut connection, &dto, TransitionAction::WithdrawRequest).await?;

        let removed = self
            .borrow_request_modifier()
            .delete_pending(&mut connection, request.id())
            .await?;
        if !removed {
            return Err(Report::new(KernelError::Conflict)
                .attach_printable("only a pending request can be withdrawn"));
        }
        connection.commit().await?;
        Ok(())
    }

    /// Shared prologue: resolve the request, its game and the principal, and
    /// run the authorization gate for `action`.
    async fn guard(
        &self,
        connection: &mut Connection,
        dto: &BorrowRequestActionDto,
        action: TransitionAction,
    ) -> error_stack::Result<(BorrowRequest, Game), KernelError> {
        let request = self
            .borrow_request_query()
            .find_by_id(connection, &BorrowRequestId::new(dto.request_id))
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable("borrow request does not exist")
            })?;
        let game = self
            .game_query()
            .find_by_id(connection, request.game_id())
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable("requested game no longer exists")
            })?;
        let principal = resolve_account(
            self.account_query(),
            connection,
            dto.acting_account_id,
            "acting",
        )
        .await?;
        ensure_transition(
            &principal,
            GuardedResource::Request {
                game_owner: game.owner_id(),
                requester: request.requester_id(),
            },
            action,
        )?;
        Ok((request, game))
    }
}

impl<Connection: Transaction + Send, T> HandleBorrowRequestService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnAccountQuery<Connection>
        + DependOnGameQuery<Connection>
        + DependOnBorrowRequestQuery<Connection>
        + DependOnBorrowRequestModifier<Connection>
        + DependOnLendingRecordModifier<Connection>
        + DependOnTimeProvider
        + DependOnLoanNotifier
{
}

#[async_trait::async_trait]
pub trait GetBorrowRequestService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnBorrowRequestQuery<Connection>
{
    async fn get_request(
        &self,
        dto: GetBorrowRequestDto,
    ) -> error_stack::Result<Option<BorrowRequestDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let request = self
            .borrow_request_query()
            .find_by_id(&mut connection, &BorrowRequestId::new(dto.id))
            .await?;
        Ok(request.map(BorrowRequestDto::from))
    }

    async fn requests_by_requester(
        &self,
        dto: GetRequestsByRequesterDto,
    ) -> error_stack::Result<Vec<BorrowRequestDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let requests = self
            .borrow_request_query()
            .find_by_requester(&mut connection, &AccountId::new(dto.requester_id))
            .await?;
        Ok(requests.into_iter().map(BorrowRequestDto::from).collect())
    }

    async fn requests_by_status(
        &self,
        dto: GetRequestsByStatusDto,
    ) -> error_stack::Result<Vec<BorrowRequestDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let requests = self
            .borrow_request_query()
            .find_by_status(&mut connection, &dto.status)
            .await?;
        Ok(requests.into_iter().map(BorrowRequestDto::from).collect())
    }
}

impl<Connection: Transaction + Send, T> GetBorrowRequestService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnBorrowRequestQuery<Connection>
{
}

#[cfg(test)]
mod test {
    use time::macros::datetime;

    use kernel::interface::notify::LoanNotice;
    use kernel::KernelError;

    use crate::service::{
        CreateBorrowRequestService, GetBorrowRequestService, HandleBorrowRequestService,
    };
    use crate::testing::TestApp;
    use crate::transfer::{
        BorrowRequestActionDto, CreateBorrowRequestDto, GetBorrowRequestDto,
    };

    fn request_dto(requester_id: i64, game_id: i64) -> CreateBorrowRequestDto {
        CreateBorrowRequestDto {
            requester_id,
            game_id,
            start_date: datetime!(2024-01-01 00:00 UTC),
            end_date: datetime!(2024-01-07 00:00 UTC),
        }
    }

    #[tokio::test]
    async fn request_is_created_pending_and_approval_opens_a_record() {
        let app = TestApp::new(datetime!(2023-12-30 12:00 UTC));
        let owner = app.seed_owner("Orla");
        let requester = app.seed_user("Una");
        let game = app.seed_game(owner, "Everdell");

        let request = app.create_request(request_dto(requester, game)).await.unwrap();
        assert_eq!(request.status, "PENDING");
        assert_eq!(request.requested_at, datetime!(2023-12-30 12:00 UTC));

        let record = app
            .approve(BorrowRequestActionDto {
                request_id: request.id,
                acting_account_id: owner,
            })
            .await
            .unwrap();
        assert_eq!(record.status, "ACTIVE");
        assert_eq!(record.request_id, request.id);
        assert_eq!(record.owner_id, owner);
        assert_eq!(record.borrower_id, requester);
        assert_eq!(record.start_date, datetime!(2024-01-01 00:00 UTC));
        assert_eq!(record.end_date, datetime!(2024-01-07 00:00 UTC));

        let settled = app
            .get_request(GetBorrowRequestDto { id: request.id })
            .await
            .unwrap()
            .expect("request still stored");
        assert_eq!(settled.status, "APPROVED");

        // the parties were told, after the commit
        assert!(matches!(
            app.notices().last(),
            Some(LoanNotice::RequestApproved { .. })
        ));
    }

    #[tokio::test]
    async fn only_the_owner_may_settle_a_request() {
        let app = TestApp::new(datetime!(2023-12-30 12:00 UTC));
        let owner = app.seed_owner("Orla");
        let requester = app.seed_user("Una");
        let bystander = app.seed_user("Beck");
        let game = app.seed_game(owner, "Everdell");

        let request = app.create_request(request_dto(requester, game)).await.unwrap();

        for principal in [requester, bystander] {
            let denied = app
                .approve(BorrowRequestActionDto {
                    request_id: request.id,
                    acting_account_id: principal,
                })
                .await
                .expect_err("non-owner approval must fail");
            assert!(matches!(denied.current_context(), KernelError::Forbidden));
        }

        // the failed attempts changed nothing
        let unchanged = app
            .get_request(GetBorrowRequestDto { id: request.id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.status, "PENDING");
    }

    #[tokio::test]
    async fn a_settled_request_cannot_be_settled_again() {
        let app = TestApp::new(datetime!(2023-12-30 12:00 UTC));
        let owner = app.seed_owner("Orla");
        let requester = app.seed_user("Una");
        let game = app.seed_game(owner, "Everdell");

        let request = app.create_request(request_dto(requester, game)).await.unwrap();
        let action = BorrowRequestActionDto {
            request_id: request.id,
            acting_account_id: owner,
        };
        app.approve(action).await.unwrap();

        let second = app
            .decline(BorrowRequestActionDto {
                request_id: request.id,
                acting_account_id: owner,
            })
            .await
            .expect_err("declining an approved request must fail");
        assert!(matches!(second.current_context(), KernelError::Conflict));
    }

    #[tokio::test]
    async fn decline_settles_without_opening_a_record() {
        let app = TestApp::new(datetime!(2023-12-30 12:00 UTC));
        let owner = app.seed_owner("Orla");
        let requester = app.seed_user("Una");
        let game = app.seed_game(owner, "Everdell");

        let request = app.create_request(request_dto(requester, game)).await.unwrap();
        let declined = app
            .decline(BorrowRequestActionDto {
                request_id: request.id,
                acting_account_id: owner,
            })
            .await
            .unwrap();
        assert_eq!(declined.status, "DECLINED");
        assert_eq!(app.record_count(), 0);
    }

    #[tokio::test]
    async fn withdraw_is_requester_only_and_pending_only() {
        let app = TestApp::new(datetime!(2023-12-30 12:00 UTC));
        let owner = app.seed_owner("Orla");
        let requester = app.seed_user("Una");
        let game = app.seed_game(owner, "Everdell");

        let request = app.create_request(request_dto(requester, game)).await.unwrap();

        let denied = app
            .withdraw(BorrowRequestActionDto {
                request_id: request.id,
                acting_account_id: owner,
            })
            .await
            .expect_err("owner cannot withdraw the requester's request");
        assert!(matches!(denied.current_context(), KernelError::Forbidden));

        app.withdraw(BorrowRequestActionDto {
            request_id: request.id,
            acting_account_id: requester,
        })
        .await
        .unwrap();
        assert!(app
            .get_request(GetBorrowRequestDto { id: request.id })
            .await
            .unwrap()
            .is_none());

        // once settled, withdrawal conflicts
        let request = app.create_request(request_dto(requester, game)).await.unwrap();
        app.approve(BorrowRequestActionDto {
            request_id: request.id,
            acting_account_id: owner,
        })
        .await
        .unwrap();
        let conflicted = app
            .withdraw(BorrowRequestActionDto {
                request_id: request.id,
                acting_account_id: requester,
            })
            .await
            .expect_err("approved request is not withdrawable");
        assert!(matches!(conflicted.current_context(), KernelError::Conflict));
    }

    #[tokio::test]
    async fn creation_validates_period_and_references() {
        let app = TestApp::new(datetime!(2023-12-30 12:00 UTC));
        let owner = app.seed_owner("Orla");
        let requester = app.seed_user("Una");
        let game = app.seed_game(owner, "Everdell");

        let inverted = app
            .create_request(CreateBorrowRequestDto {
                requester_id: requester,
                game_id: game,
                start_date: datetime!(2024-01-07 00:00 UTC),
                end_date: datetime!(2024-01-01 00:00 UTC),
            })
            .await
            .expect_err("inverted period must fail");
        assert!(matches!(inverted.current_context(), KernelError::Validation));

        let missing_game = app
            .create_request(request_dto(requester, 9999))
            .await
            .expect_err("unknown game must fail");
        assert!(matches!(missing_game.current_context(), KernelError::NotFound));

        let missing_requester = app
            .create_request(request_dto(9999, game))
            .await
            .expect_err("unknown requester must fail");
        assert!(matches!(
            missing_requester.current_context(),
            KernelError::NotFound
        ));
    }
}
