use crate::controller::FetchRequest;
use crate::feed::FetchError;
use crate::model::Entry;

#[derive(Debug)]
pub enum Action {
    Fetch(FetchRequest),
    Quit,
}

#[derive(Debug)]
pub enum AppEvent {
    BirthsLoaded {
        seq: u64,
        result: Result<Vec<Entry>, FetchError>,
    },
    Status(String),
}
