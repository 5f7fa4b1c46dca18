use error_stack::Report;

use kernel::interface::authorize::{ensure_transition, GuardedResource, TransitionAction};
use kernel::interface::clock::{DependOnTimeProvider, TimeProvider};
use kernel::interface::database::{
    DatabaseConnection, DependOnDatabaseConnection, Transaction,
};
use kernel::interface::query::{
    DependOnAccountQuery, DependOnEventQuery, DependOnGameQuery, DependOnRegistrationQuery,
    EventQuery, GameQuery, RegistrationQuery,
};
use kernel::interface::update::{
    DependOnEventModifier, DependOnRegistrationModifier, EventModifier, RegistrationModifier,
};
use kernel::prelude::entity::{
    CreatedAt, EventCapacity, EventDescription, EventDraft, EventId, EventLocation,
    EventRevision, EventTitle, GameId, HeldAt, RegistrationDraft, RegistrationId,
};
use kernel::KernelError;

use crate::service::resolve_account;
use crate::transfer::{
    CreateEventDto, EventDto, GetEventDto, RegisterDto, RegistrationDto, ReviseEventDto,
    UnregisterDto,
};

#[async_trait::async_trait]
pub trait HandleEventService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnAccountQuery<Connection>
    + DependOnGameQuery<Connection>
    + DependOnEventQuery<Connection>
    + DependOnEventModifier<Connection>
{
    async fn create_event(&self, dto: CreateEventDto) -> error_stack::Result<EventDto, KernelError> {
        let capacity = EventCapacity::new(dto.max_participants)?;
        let mut connection = self.database_connection().transact().await?;

        let host =
            resolve_account(self.account_query(), &mut connection, dto.host_id, "host").await?;
        let game = self
            .game_query()
            .find_by_id(&mut connection, &GameId::new(dto.game_id))
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable("featured game does not exist")
            })?;

        let draft = EventDraft::new(
            EventTitle::new(dto.title),
            HeldAt::new(dto.held_at),
            EventLocation::new(dto.location),
            EventDescription::new(dto.description),
            capacity,
            host.id().clone(),
            game.id().clone(),
        );
        let event = self.event_modifier().create(&mut connection, &draft).await?;
        connection.commit().await?;

        Ok(EventDto::project(event, 0))
    }

    /// Host-only. A revised capacity is re-checked against the registration
    /// count inside the store, so it can never strand existing attendees.
    async fn revise_event(&self, dto: ReviseEventDto) -> error_stack::Result<EventDto, KernelError> {
        let capacity = dto.max_participants.map(EventCapacity::new).transpose()?;
        let mut connection = self.database_connection().transact().await?;

        let event_id = EventId::new(dto.event_id);
        let event = self
            .event_query()
            .find_by_id(&mut connection, &event_id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound).attach_printable("event does not exist")
            })?;
        let principal = resolve_account(
            self.account_query(),
            &mut connection,
            dto.acting_account_id,
            "acting",
        )
        .await?;
        ensure_transition(
            &principal,
            GuardedResource::Event {
                host: event.host_id(),
            },
            TransitionAction::ReviseEvent,
        )?;

        let revision = EventRevision::new(
            dto.title.map(EventTitle::new),
            dto.held_at.map(HeldAt::new),
            dto.location.map(EventLocation::new),
            dto.description.map(EventDescription::new),
            capacity,
        );
        let applied = self
            .event_modifier()
            .revise(&mut connection, &event_id, &revision)
            .await?;
        if !applied {
            return Err(Report::new(KernelError::Validation).attach_printable(
                "max participants cannot drop below the current registration count",
            ));
        }

        let event = self
            .event_query()
            .find_by_id(&mut connection, &event_id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound).attach_printable("event vanished mid-update")
            })?;
        let registered = self
            .event_query()
            .registered_count(&mut connection, &event_id)
            .await?;
        connection.commit().await?;

        Ok(EventDto::project(event, registered))
    }
}

impl<Connection: Transaction + Send, T> HandleEventService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnAccountQuery<Connection>
        + DependOnGameQuery<Connection>
        + DependOnEventQuery<Connection>
        + DependOnEventModifier<Connection>
{
}

#[async_trait::async_trait]
pub trait HandleRegistrationService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnAccountQuery<Connection>
    + DependOnEventQuery<Connection>
    + DependOnRegistrationQuery<Connection>
    + DependOnRegistrationModifier<Connection>
    + DependOnTimeProvider
{
    /// One seat per attendee, never past capacity. The duplicate pre-check
    /// gives the precise error; the store's uniqueness constraint covers the
    /// concurrent case with the same `Conflict` outcome.
    async fn register(&self, dto: RegisterDto) -> error_stack::Result<RegistrationDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let attendee = resolve_account(
            self.account_query(),
            &mut connection,
            dto.attendee_id,
            "attendee",
        )
        .await?;
        let event_id = EventId::new(dto.event_id);
        self.event_query()
            .find_by_id(&mut connection, &event_id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound).attach_printable("event does not exist")
            })?;

        let existing = self
            .registration_query()
            .find_by_event_and_attendee(&mut connection, &event_id, attendee.id())
            .await?;
        if existing.is_some() {
            return Err(Report::new(KernelError::Conflict)
                .attach_printable("attendee already holds a registration for this event"));
        }

        let draft = RegistrationDraft::new(
            event_id,
            attendee.id().clone(),
            CreatedAt::new(self.time_provider().now()),
        );
        let seat = self
            .registration_modifier()
            .create_within_capacity(&mut connection, &draft)
            .await?;
        let Some(registration) = seat else {
            return Err(
                Report::new(KernelError::Conflict).attach_printable("event is at capacity")
            );
        };
        connection.commit().await?;

        Ok(RegistrationDto::from(registration))
    }

    /// Attendee-only removal; the freed seat is available immediately.
    async fn unregister(&self, dto: UnregisterDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let registration_id = RegistrationId::new(dto.registration_id);
        let registration = self
            .registration_query()
            .find_by_id(&mut connection, &registration_id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound).attach_printable("registration does not exist")
            })?;
        let principal = resolve_account(
            self.account_query(),
            &mut connection,
            dto.acting_account_id,
            "acting",
        )
        .await?;
        ensure_transition(
            &principal,
            GuardedResource::Registration {
                attendee: registration.attendee_id(),
            },
            TransitionAction::CancelRegistration,
        )?;

        let removed = self
            .registration_modifier()
            .delete(&mut connection, &registration_id)
            .await?;
        if !removed {
            return Err(Report::new(KernelError::Conflict)
                .attach_printable("registration was already cancelled"));
        }
        connection.commit().await?;
        Ok(())
    }
}

impl<Connection: Transaction + Send, T> HandleRegistrationService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnAccountQuery<Connection>
        + DependOnEventQuery<Connection>
        + DependOnRegistrationQuery<Connection>
        + DependOnRegistrationModifier<Connection>
        + DependOnTimeProvider
{
}

#[async_trait::async_trait]
pub trait GetEventService<Connection: Transaction + Send>:
    'static + Sync + Send + DependOnDatabaseConnection<Connection> + DependOnEventQuery<Connection>
{
    async fn get_event(&self, dto: GetEventDto) -> error_stack::Result<Option<EventDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let event_id = EventId::new(dto.id);
        let Some(event) = self.event_query().find_by_id(&mut connection, &event_id).await? else {
            return Ok(None);
        };
        let registered = self
            .event_query()
            .registered_count(&mut connection, &event_id)
            .await?;
        Ok(Some(EventDto::project(event, registered)))
    }
}

impl<Connection: Transaction + Send, T> GetEventService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnEventQuery<Connection>
{
}

#[cfg(test)]
mod test {
    use time::macros::datetime;

    use kernel::KernelError;

    use crate::service::{GetEventService, HandleEventService, HandleRegistrationService};
    use crate::testing::TestApp;
    use crate::transfer::{
        CreateEventDto, GetEventDto, RegisterDto, ReviseEventDto, UnregisterDto,
    };

    fn event_dto(host_id: i64, game_id: i64, max_participants: i32) -> CreateEventDto {
        CreateEventDto {
            title: "Worker-placement night".to_string(),
            held_at: datetime!(2024-03-01 18:00 UTC),
            location: "Community hall".to_string(),
            description: "Casual round, newcomers welcome".to_string(),
            max_participants,
            host_id,
            game_id,
        }
    }

    #[tokio::test]
    async fn single_seat_event_fills_frees_and_fills_again() {
        let app = TestApp::new(datetime!(2024-02-01 09:00 UTC));
        let host = app.seed_owner("Orla");
        let first = app.seed_user("Una");
        let second = app.seed_user("Beck");
        let game = app.seed_game(host, "Cascadia");

        let event = app.create_event(event_dto(host, game, 1)).await.unwrap();

        let seat = app
            .register(RegisterDto {
                event_id: event.id,
                attendee_id: first,
            })
            .await
            .unwrap();

        // the room is full, the second attempt writes nothing
        let full = app
            .register(RegisterDto {
                event_id: event.id,
                attendee_id: second,
            })
            .await
            .expect_err("event is at capacity");
        assert!(matches!(full.current_context(), KernelError::Conflict));
        let counted = app
            .get_event(GetEventDto { id: event.id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(counted.registered_count, 1);

        app.unregister(UnregisterDto {
            registration_id: seat.id,
            acting_account_id: first,
        })
        .await
        .unwrap();

        app.register(RegisterDto {
            event_id: event.id,
            attendee_id: second,
        })
        .await
        .expect("freed seat is available again");
    }

    #[tokio::test]
    async fn one_registration_per_attendee() {
        let app = TestApp::new(datetime!(2024-02-01 09:00 UTC));
        let host = app.seed_owner("Orla");
        let attendee = app.seed_user("Una");
        let game = app.seed_game(host, "Cascadia");
        let event = app.create_event(event_dto(host, game, 4)).await.unwrap();

        app.register(RegisterDto {
            event_id: event.id,
            attendee_id: attendee,
        })
        .await
        .unwrap();

        let twice = app
            .register(RegisterDto {
                event_id: event.id,
                attendee_id: attendee,
            })
            .await
            .expect_err("duplicate registration must fail");
        assert!(matches!(twice.current_context(), KernelError::Conflict));

        let counted = app
            .get_event(GetEventDto { id: event.id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(counted.registered_count, 1);
    }

    #[tokio::test]
    async fn only_the_attendee_cancels_their_registration() {
        let app = TestApp::new(datetime!(2024-02-01 09:00 UTC));
        let host = app.seed_owner("Orla");
        let attendee = app.seed_user("Una");
        let game = app.seed_game(host, "Cascadia");
        let event = app.create_event(event_dto(host, game, 4)).await.unwrap();
        let seat = app
            .register(RegisterDto {
                event_id: event.id,
                attendee_id: attendee,
            })
            .await
            .unwrap();

        let denied = app
            .unregister(UnregisterDto {
                registration_id: seat.id,
                acting_account_id: host,
            })
            .await
            .expect_err("host cannot cancel someone else's seat");
        assert!(matches!(denied.current_context(), KernelError::Forbidden));
    }

    #[tokio::test]
    async fn capacity_is_validated_on_create_and_revise() {
        let app = TestApp::new(datetime!(2024-02-01 09:00 UTC));
        let host = app.seed_owner("Orla");
        let first = app.seed_user("Una");
        let second = app.seed_user("Beck");
        let game = app.seed_game(host, "Cascadia");

        let empty = app
            .create_event(event_dto(host, game, 0))
            .await
            .expect_err("capacity below 1 is invalid");
        assert!(matches!(empty.current_context(), KernelError::Validation));

        let event = app.create_event(event_dto(host, game, 2)).await.unwrap();
        for attendee in [first, second] {
            app.register(RegisterDto {
                event_id: event.id,
                attendee_id: attendee,
            })
            .await
            .unwrap();
        }

        let negative = app
            .revise_event(ReviseEventDto {
                event_id: event.id,
                acting_account_id: host,
                title: None,
                held_at: None,
                location: None,
                description: None,
                max_participants: Some(-1),
            })
            .await
            .expect_err("negative capacity is invalid");
        assert!(matches!(negative.current_context(), KernelError::Validation));

        let stranded = app
            .revise_event(ReviseEventDto {
                event_id: event.id,
                acting_account_id: host,
                title: None,
                held_at: None,
                location: None,
                description: None,
                max_participants: Some(1),
            })
            .await
            .expect_err("two attendees cannot fit in one seat");
        assert!(matches!(stranded.current_context(), KernelError::Validation));

        let widened = app
            .revise_event(ReviseEventDto {
                event_id: event.id,
                acting_account_id: host,
                title: Some("Worker-placement night, big table".to_string()),
                held_at: None,
                location: None,
                description: None,
                max_participants: Some(6),
            })
            .await
            .unwrap();
        assert_eq!(widened.max_participants, 6);
        assert_eq!(widened.title, "Worker-placement night, big table");
        assert_eq!(widened.registered_count, 2);

        // not the host, not allowed
        let denied = app
            .revise_event(ReviseEventDto {
                event_id: event.id,
                acting_account_id: first,
                title: None,
                held_at: None,
                location: None,
                description: None,
                max_participants: None,
            })
            .await
            .expect_err("only the host revises the event");
        assert!(matches!(denied.current_context(), KernelError::Forbidden));
    }
}
