use async_trait::async_trait;
use dutyboard_core::{
    DuplicateOn, Duty, DutyError, DutyGateway, DutyService, ErrorCode, ExistsCriterion,
    GatewayError, GatewayResult,
};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Barrier;
use tokio::time::timeout;
use uuid::Uuid;

const ID: &str = "01JMGAEX00BJQADQJW52NCFHX5";
const NAME: &str = "Duty 1";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Exists(ExistsCriterion),
    List,
    Insert(String, String),
    Update(String, String),
    Remove(String),
}

/// Scripted gateway that records every call it receives.
struct FakeGateway {
    id_exists: GatewayResult<bool>,
    name_exists: GatewayResult<bool>,
    list: GatewayResult<Vec<Duty>>,
    write: Option<GatewayResult<Duty>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeGateway {
    fn new() -> Self {
        Self {
            id_exists: Ok(false),
            name_exists: Ok(false),
            list: Ok(Vec::new()),
            write: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn id_exists(mut self, result: GatewayResult<bool>) -> Self {
        self.id_exists = result;
        self
    }

    fn name_exists(mut self, result: GatewayResult<bool>) -> Self {
        self.name_exists = result;
        self
    }

    fn list(mut self, result: GatewayResult<Vec<Duty>>) -> Self {
        self.list = result;
        self
    }

    fn write(mut self, result: GatewayResult<Duty>) -> Self {
        self.write = Some(result);
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Insert(..) | Call::Update(..) | Call::Remove(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_result(&self, id: &str, name: &str) -> GatewayResult<Duty> {
        self.write
            .clone()
            .unwrap_or_else(|| Ok(Duty::new(id, name)))
    }
}

#[async_trait]
impl DutyGateway for FakeGateway {
    async fn exists(&self, criterion: &ExistsCriterion) -> GatewayResult<bool> {
        self.record(Call::Exists(criterion.clone()));
        match criterion {
            ExistsCriterion::Id(_) => self.id_exists.clone(),
            ExistsCriterion::Name(_) => self.name_exists.clone(),
        }
    }

    async fn list(&self) -> GatewayResult<Vec<Duty>> {
        self.record(Call::List);
        self.list.clone()
    }

    async fn insert(&self, id: &str, name: &str) -> GatewayResult<Duty> {
        self.record(Call::Insert(id.to_string(), name.to_string()));
        self.write_result(id, name)
    }

    async fn update(&self, id: &str, name: &str) -> GatewayResult<Duty> {
        self.record(Call::Update(id.to_string(), name.to_string()));
        self.write_result(id, name)
    }

    async fn remove(&self, id: &str) -> GatewayResult<Duty> {
        self.record(Call::Remove(id.to_string()));
        self.write_result(id, NAME)
    }
}

fn unknown_error() -> GatewayError {
    GatewayError::internal("Unknown error")
}

fn by_id(id: &str) -> Call {
    Call::Exists(ExistsCriterion::Id(id.to_string()))
}

fn by_name(name: &str) -> Call {
    Call::Exists(ExistsCriterion::Name(name.to_string()))
}

// ---- list ----

#[tokio::test]
async fn list_returns_empty_duties() {
    let service = DutyService::new(FakeGateway::new());

    assert_eq!(service.list_duties().await.unwrap(), Vec::<Duty>::new());
    assert_eq!(service.gateway().calls(), vec![Call::List]);
}

#[tokio::test]
async fn list_returns_all_duties() {
    let duties = vec![
        Duty::new("01JMGAR1Z0E1JD2AXYX5YJ52A7", "Duty 1"),
        Duty::new("01JMGB16Y0SVZ6ZBJX3XQG9FQF", "Duty 2"),
        Duty::new("01JMGBABX0A4ST2YAGHYHHKVTD", "Duty 3"),
    ];
    let service = DutyService::new(FakeGateway::new().list(Ok(duties.clone())));

    assert_eq!(service.list_duties().await.unwrap(), duties);
    assert!(service.gateway().writes().is_empty());
}

#[tokio::test]
async fn list_propagates_gateway_failure() {
    let service = DutyService::new(FakeGateway::new().list(Err(unknown_error())));

    let err = service.list_duties().await.unwrap_err();
    assert_eq!(err, DutyError::Internal(unknown_error()));
    assert_eq!(err.to_string(), "Unknown error");
    assert_eq!(err.code().as_str(), "INTERNAL_SERVER_ERROR");
}

// ---- create ----

#[tokio::test]
async fn create_rejects_empty_name_without_gateway_calls() {
    let service = DutyService::new(FakeGateway::new());

    let err = service.create_duty("").await.unwrap_err();
    assert_eq!(err, DutyError::InvalidInput);
    assert_eq!(err.to_string(), "Invalid user input");
    assert_eq!(err.code(), ErrorCode::BadUserInput);
    assert!(service.gateway().calls().is_empty());
}

#[tokio::test]
async fn create_rejects_duplicate_name() {
    let service = DutyService::new(FakeGateway::new().name_exists(Ok(true)));

    let err = service.create_duty(NAME).await.unwrap_err();
    assert_eq!(err, DutyError::DuplicateName(DuplicateOn::Create));
    assert_eq!(err.to_string(), "Duty already existed");
    assert_eq!(err.code(), ErrorCode::BadUserInput);
    assert_eq!(service.gateway().calls(), vec![by_name(NAME)]);
}

#[tokio::test]
async fn create_propagates_existence_check_failure() {
    let service = DutyService::new(FakeGateway::new().name_exists(Err(unknown_error())));

    let err = service.create_duty(NAME).await.unwrap_err();
    assert_eq!(err, DutyError::Internal(unknown_error()));
    assert_eq!(service.gateway().calls(), vec![by_name(NAME)]);
}

#[tokio::test]
async fn create_inserts_once_with_generated_id() {
    let service = DutyService::new(FakeGateway::new());

    let duty = service.create_duty(NAME).await.unwrap();
    assert_eq!(duty.name, NAME);
    assert!(!duty.id.is_empty());
    assert!(Uuid::parse_str(&duty.id).is_ok());
    assert_eq!(
        service.gateway().calls(),
        vec![by_name(NAME), Call::Insert(duty.id.clone(), NAME.to_string())]
    );
}

#[tokio::test]
async fn create_generates_fresh_ids() {
    let service = DutyService::new(FakeGateway::new());

    let first = service.create_duty("Duty 1").await.unwrap();
    let second = service.create_duty("Duty 2").await.unwrap();
    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn create_propagates_insert_failure() {
    let service = DutyService::new(FakeGateway::new().write(Err(unknown_error())));

    let err = service.create_duty(NAME).await.unwrap_err();
    assert_eq!(err, DutyError::Internal(unknown_error()));
    assert_eq!(service.gateway().writes().len(), 1);
}

// ---- update ----

#[tokio::test]
async fn update_rejects_empty_inputs_without_gateway_calls() {
    for (id, name) in [("", NAME), (ID, ""), ("", "")] {
        let service = DutyService::new(FakeGateway::new());

        let err = service.update_duty(id, name).await.unwrap_err();
        assert_eq!(err, DutyError::InvalidInput, "id={id:?} name={name:?}");
        assert!(service.gateway().calls().is_empty());
    }
}

#[tokio::test]
async fn update_missing_duty_is_not_found() {
    let service = DutyService::new(FakeGateway::new().id_exists(Ok(false)));

    let err = service.update_duty(ID, NAME).await.unwrap_err();
    assert_eq!(err, DutyError::NotFound);
    assert_eq!(err.to_string(), "Duty not found");

    let calls = service.gateway().calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.contains(&by_id(ID)));
    assert!(calls.contains(&by_name(NAME)));
    assert!(service.gateway().writes().is_empty());
}

#[tokio::test]
async fn update_not_found_wins_over_duplicate_name() {
    let service = DutyService::new(
        FakeGateway::new()
            .id_exists(Ok(false))
            .name_exists(Ok(true)),
    );

    let err = service.update_duty(ID, NAME).await.unwrap_err();
    assert_eq!(err, DutyError::NotFound);
}

#[tokio::test]
async fn update_propagates_id_check_failure() {
    let service = DutyService::new(FakeGateway::new().id_exists(Err(unknown_error())));

    let err = service.update_duty(ID, NAME).await.unwrap_err();
    assert_eq!(err, DutyError::Internal(unknown_error()));
    assert!(service.gateway().writes().is_empty());
}

#[tokio::test]
async fn update_propagates_name_check_failure() {
    let service = DutyService::new(
        FakeGateway::new()
            .id_exists(Ok(true))
            .name_exists(Err(unknown_error())),
    );

    let err = service.update_duty(ID, NAME).await.unwrap_err();
    assert_eq!(err, DutyError::Internal(unknown_error()));
    assert!(service.gateway().writes().is_empty());
}

#[tokio::test]
async fn update_rejects_name_used_by_another_duty() {
    let service = DutyService::new(
        FakeGateway::new()
            .id_exists(Ok(true))
            .name_exists(Ok(true)),
    );

    let err = service.update_duty(ID, NAME).await.unwrap_err();
    assert_eq!(err, DutyError::DuplicateName(DuplicateOn::Update));
    assert_eq!(err.code(), ErrorCode::BadUserInput);
    assert_ne!(
        err.to_string(),
        DutyError::DuplicateName(DuplicateOn::Create).to_string()
    );
    assert!(service.gateway().writes().is_empty());
}

#[tokio::test]
async fn update_renames_existing_duty_once() {
    let service = DutyService::new(FakeGateway::new().id_exists(Ok(true)));

    let duty = service.update_duty(ID, "Duty 2").await.unwrap();
    assert_eq!(duty, Duty::new(ID, "Duty 2"));
    assert_eq!(
        service.gateway().writes(),
        vec![Call::Update(ID.to_string(), "Duty 2".to_string())]
    );
}

#[tokio::test]
async fn update_propagates_write_failure() {
    let service = DutyService::new(
        FakeGateway::new()
            .id_exists(Ok(true))
            .write(Err(unknown_error())),
    );

    let err = service.update_duty(ID, NAME).await.unwrap_err();
    assert_eq!(err, DutyError::Internal(unknown_error()));
}

/// Existence checks rendezvous on a two-party barrier, so they only complete
/// when both are in flight at the same time.
struct RendezvousGateway {
    barrier: Barrier,
}

#[async_trait]
impl DutyGateway for RendezvousGateway {
    async fn exists(&self, criterion: &ExistsCriterion) -> GatewayResult<bool> {
        self.barrier.wait().await;
        Ok(matches!(criterion, ExistsCriterion::Id(_)))
    }

    async fn list(&self) -> GatewayResult<Vec<Duty>> {
        Ok(Vec::new())
    }

    async fn insert(&self, id: &str, name: &str) -> GatewayResult<Duty> {
        Ok(Duty::new(id, name))
    }

    async fn update(&self, id: &str, name: &str) -> GatewayResult<Duty> {
        Ok(Duty::new(id, name))
    }

    async fn remove(&self, id: &str) -> GatewayResult<Duty> {
        Ok(Duty::new(id, NAME))
    }
}

/// Id check never resolves; name check fails immediately.
struct StalledIdGateway;

#[async_trait]
impl DutyGateway for StalledIdGateway {
    async fn exists(&self, criterion: &ExistsCriterion) -> GatewayResult<bool> {
        match criterion {
            ExistsCriterion::Id(_) => std::future::pending().await,
            ExistsCriterion::Name(_) => Err(GatewayError::internal("boom")),
        }
    }

    async fn list(&self) -> GatewayResult<Vec<Duty>> {
        Ok(Vec::new())
    }

    async fn insert(&self, id: &str, name: &str) -> GatewayResult<Duty> {
        Ok(Duty::new(id, name))
    }

    async fn update(&self, id: &str, name: &str) -> GatewayResult<Duty> {
        Ok(Duty::new(id, name))
    }

    async fn remove(&self, id: &str) -> GatewayResult<Duty> {
        Ok(Duty::new(id, NAME))
    }
}

#[tokio::test]
async fn update_issues_both_checks_concurrently() {
    let service = DutyService::new(RendezvousGateway {
        barrier: Barrier::new(2),
    });

    let duty = timeout(Duration::from_secs(5), service.update_duty(ID, "Duty 2"))
        .await
        .expect("existence checks were not in flight together")
        .unwrap();
    assert_eq!(duty, Duty::new(ID, "Duty 2"));
}

#[tokio::test]
async fn update_returns_first_check_failure_without_waiting_for_the_other() {
    let service = DutyService::new(StalledIdGateway);

    let err = timeout(Duration::from_secs(5), service.update_duty(ID, NAME))
        .await
        .expect("update waited on the stalled id check")
        .unwrap_err();
    assert_eq!(err, DutyError::Internal(GatewayError::internal("boom")));
}

// ---- delete ----

#[tokio::test]
async fn delete_rejects_empty_id_without_gateway_calls() {
    let service = DutyService::new(FakeGateway::new());

    assert_eq!(
        service.delete_duty("").await.unwrap_err(),
        DutyError::InvalidInput
    );
    assert!(service.gateway().calls().is_empty());
}

#[tokio::test]
async fn delete_missing_duty_is_not_found() {
    let service = DutyService::new(FakeGateway::new().id_exists(Ok(false)));

    assert_eq!(service.delete_duty(ID).await.unwrap_err(), DutyError::NotFound);
    assert_eq!(service.gateway().calls(), vec![by_id(ID)]);
}

#[tokio::test]
async fn delete_propagates_existence_check_failure() {
    let service = DutyService::new(FakeGateway::new().id_exists(Err(unknown_error())));

    let err = service.delete_duty(ID).await.unwrap_err();
    assert_eq!(err, DutyError::Internal(unknown_error()));
    assert_eq!(service.gateway().calls(), vec![by_id(ID)]);
}

#[tokio::test]
async fn delete_removes_existing_duty_once() {
    let service = DutyService::new(
        FakeGateway::new()
            .id_exists(Ok(true))
            .write(Ok(Duty::new(ID, NAME))),
    );

    let duty = service.delete_duty(ID).await.unwrap();
    assert_eq!(duty, Duty::new(ID, NAME));
    assert_eq!(
        service.gateway().calls(),
        vec![by_id(ID), Call::Remove(ID.to_string())]
    );
}

#[tokio::test]
async fn delete_propagates_remove_failure() {
    let service = DutyService::new(
        FakeGateway::new()
            .id_exists(Ok(true))
            .write(Err(unknown_error())),
    );

    let err = service.delete_duty(ID).await.unwrap_err();
    assert_eq!(err, DutyError::Internal(unknown_error()));
}
