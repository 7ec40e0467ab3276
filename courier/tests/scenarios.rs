//! End-to-end: modules registered on an Application, dispatched through the Mediator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use courier::{
    async_trait, Application, BoxError, CancellationToken, Command, CommandHandler, Container,
    ContainerError, HandlerModule, MediatorError, MediatorOptions, Request, RequestHandler,
    ValidationError, ValidationResult, ValidationStrategy, Validator,
};

type Store = Arc<Mutex<HashMap<u32, String>>>;

#[derive(Clone, Debug, Command)]
struct SaveNote {
    id: u32,
    text: String,
}

#[derive(Clone, Debug, Request)]
#[response(Option<String>)]
struct GetNote {
    id: u32,
}

struct SaveNoteHandler {
    store: Store,
}

#[async_trait]
impl CommandHandler<SaveNote> for SaveNoteHandler {
    async fn handle(&self, command: SaveNote, _cancel: &CancellationToken) -> Result<(), BoxError> {
        let mut notes = self.store.lock().map_err(|e| e.to_string())?;
        notes.insert(command.id, command.text);
        Ok(())
    }
}

struct GetNoteHandler {
    store: Store,
}

#[async_trait]
impl RequestHandler<GetNote> for GetNoteHandler {
    async fn handle(&self, request: GetNote, _cancel: &CancellationToken) -> Result<Option<String>, BoxError> {
        let notes = self.store.lock().map_err(|e| e.to_string())?;
        Ok(notes.get(&request.id).cloned())
    }
}

#[derive(Clone, Debug, Command)]
struct ArchiveNote {
    id: u32,
}

struct ArchiveNoteHandler {
    store: Store,
}

#[async_trait]
impl CommandHandler<ArchiveNote> for ArchiveNoteHandler {
    async fn handle(&self, command: ArchiveNote, _cancel: &CancellationToken) -> Result<(), BoxError> {
        let mut notes = self.store.lock().map_err(|e| e.to_string())?;
        notes.remove(&command.id);
        Ok(())
    }
}

struct TextNotEmpty;

#[async_trait]
impl Validator<SaveNote> for TextNotEmpty {
    async fn validate(
        &self,
        request: &SaveNote,
        _cancel: &CancellationToken,
    ) -> Result<ValidationResult, BoxError> {
        if request.text.trim().is_empty() {
            Ok(ValidationError::new("Text", "Text must not be empty").into())
        } else {
            Ok(ValidationResult::success())
        }
    }
}

struct IdNonZero;

#[async_trait]
impl Validator<SaveNote> for IdNonZero {
    async fn validate(
        &self,
        request: &SaveNote,
        _cancel: &CancellationToken,
    ) -> Result<ValidationResult, BoxError> {
        if request.id == 0 {
            Ok(ValidationError::new("Id", "Id must be non-zero").into())
        } else {
            Ok(ValidationResult::success())
        }
    }
}

fn store_of(c: &Container) -> Store {
    c.resolve::<Store>().unwrap_or_default()
}

fn notes_module() -> HandlerModule {
    HandlerModule::new("notes")
        .instance::<Store>(Arc::new(Mutex::new(HashMap::new())))
        .command_factory::<SaveNote, _, _>(|c| SaveNoteHandler { store: store_of(c) })
        .request_factory::<GetNote, _, _>(|c| GetNoteHandler { store: store_of(c) })
        .validator::<SaveNote, _>(TextNotEmpty)
        .validator::<SaveNote, _>(IdNonZero)
}

#[tokio::test]
async fn saved_note_can_be_read_back() {
    let mut app = Application::new();
    app.register(&mut notes_module()).unwrap();
    let mediator = app.into_mediator();
    let cancel = CancellationToken::new();

    mediator
        .send_command(
            SaveNote {
                id: 1,
                text: "hello".into(),
            },
            &cancel,
        )
        .await
        .unwrap();
    let note = mediator.send(GetNote { id: 1 }, &cancel).await.unwrap();
    assert_eq!(note.as_deref(), Some("hello"));
    assert_eq!(mediator.send(GetNote { id: 2 }, &cancel).await.unwrap(), None);
}

#[tokio::test]
async fn rejected_note_is_not_stored() {
    let mut app = Application::new().with_options(
        MediatorOptions::default().validation(ValidationStrategy::Sequential),
    );
    app.register(&mut notes_module()).unwrap();
    let mediator = app.into_mediator();
    let cancel = CancellationToken::new();

    let err = mediator
        .send_command(
            SaveNote {
                id: 0,
                text: " ".into(),
            },
            &cancel,
        )
        .await
        .unwrap_err();
    let result = err.validation_result().expect("validation failure");
    assert_eq!(result.to_string(), "Text: Text must not be empty; Id: Id must be non-zero");
    assert_eq!(mediator.send(GetNote { id: 0 }, &cancel).await.unwrap(), None);
}

#[tokio::test]
async fn request_without_module_has_no_handler() {
    let mediator = Application::new().into_mediator();
    let err = mediator
        .send(GetNote { id: 1 }, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, MediatorError::HandlerNotFound(name) if name.ends_with("GetNote")));
}

#[test]
fn module_drains_its_registrations() {
    let mut module = notes_module();
    assert_eq!(module.len(), 5);
    let mut app = Application::new();
    app.register(&mut module).unwrap();
    assert!(module.is_empty());
    assert!(app.container().contains::<Store>());
}

#[test]
fn two_modules_binding_one_request_conflict() {
    let mut app = Application::new();
    app.register(&mut notes_module()).unwrap();
    let mut other = HandlerModule::new("other").request::<GetNote, _>(GetNoteHandler {
        store: Store::default(),
    });
    let err = app.register(&mut other).unwrap_err();
    assert!(matches!(err, ContainerError::AlreadyRegistered(_)));
}

#[tokio::test]
async fn conflicting_module_registers_nothing() {
    let mut app = Application::new();
    app.register(&mut notes_module()).unwrap();
    let mut archive = HandlerModule::new("archive")
        .command::<ArchiveNote, _>(ArchiveNoteHandler {
            store: Store::default(),
        })
        .request::<GetNote, _>(GetNoteHandler {
            store: Store::default(),
        });

    let err = app.register(&mut archive).unwrap_err();
    assert!(matches!(err, ContainerError::AlreadyRegistered(name) if name.contains("GetNote")));
    assert_eq!(archive.len(), 2);

    let mediator = app.into_mediator();
    let err = mediator
        .send_command(ArchiveNote { id: 1 }, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.is_handler_not_found());
}

#[test]
fn module_binding_one_command_twice_is_rejected_whole() {
    let mut module = HandlerModule::new("twice")
        .instance::<Store>(Store::default())
        .command::<ArchiveNote, _>(ArchiveNoteHandler {
            store: Store::default(),
        })
        .command::<ArchiveNote, _>(ArchiveNoteHandler {
            store: Store::default(),
        });
    let mut app = Application::new();
    let err = app.register(&mut module).unwrap_err();
    assert!(matches!(err, ContainerError::AlreadyRegistered(name) if name.contains("ArchiveNote")));
    assert_eq!(module.len(), 3);
    assert!(!app.container().contains::<Store>());

    let mut retry = HandlerModule::new("once").command::<ArchiveNote, _>(ArchiveNoteHandler {
        store: Store::default(),
    });
    app.register(&mut retry).unwrap();
    assert!(retry.is_empty());
}
