//! Remote operations and the status code each one treats as success.

use std::fmt;

/// Every call this crate makes against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListRepositories,
    Query,
    Describe,
    Update,
    Append,
    Overwrite,
    GetNamespace,
    SetNamespace,
    DeleteNamespace,
    Contexts,
    Size,
    Clear,
    ClearContext,
    CreateRepository,
    DeleteRepository,
    /// GET of a remote data file ahead of an append or overwrite.
    FetchSource,
}

impl Operation {
    /// Reads answer 200 with a body, writes answer 204 without one.
    pub fn expected_status(self) -> u16 {
        match self {
            Operation::ListRepositories
            | Operation::Query
            | Operation::Describe
            | Operation::GetNamespace
            | Operation::Contexts
            | Operation::Size
            | Operation::FetchSource => 200,
            Operation::Update
            | Operation::Append
            | Operation::Overwrite
            | Operation::SetNamespace
            | Operation::DeleteNamespace
            | Operation::Clear
            | Operation::ClearContext
            | Operation::CreateRepository
            | Operation::DeleteRepository => 204,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::ListRepositories => "list repositories",
            Operation::Query => "query",
            Operation::Describe => "describe query",
            Operation::Update => "update query",
            Operation::Append => "append data to the repository",
            Operation::Overwrite => "overwrite data in the repository",
            Operation::GetNamespace => "get namespace",
            Operation::SetNamespace => "set namespace",
            Operation::DeleteNamespace => "delete namespace",
            Operation::Contexts => "list contexts",
            Operation::Size => "repository size",
            Operation::Clear => "clear repository",
            Operation::ClearContext => "clear context",
            Operation::CreateRepository => "create repository",
            Operation::DeleteRepository => "delete repository",
            Operation::FetchSource => "fetch data file",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
