pub mod dashboard;

#[derive(Debug)]
pub enum Action {
    Dashboard { api_url: String },
}
