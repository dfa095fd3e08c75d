//! Gateway operations and their HTTP routing.

use std::fmt;
use std::str::FromStr;

/// HTTP method used for a gateway operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// Operations exposed by the Sentinel gateway.
///
/// Each operation has a stable dotted name (e.g. `backups:list`) used by the
/// plugin and a fixed method/endpoint pair on the HTTP API. Several names are
/// aliases for the same endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    HealthGet,
    AgentHeartbeatStatus,
    MemoriesCreate,
    MemoriesSaveThought,
    MemoriesSearch,
    BackupsCreate,
    BackupsCreateSnapshot,
    BackupsList,
    AuditLogsIngest,
    SecretsStore,
    SecretsRetrieveAll,
}

impl ApiOperation {
    /// All operation variants for iteration.
    pub const ALL: [ApiOperation; 11] = [
        ApiOperation::HealthGet,
        ApiOperation::AgentHeartbeatStatus,
        ApiOperation::MemoriesCreate,
        ApiOperation::MemoriesSaveThought,
        ApiOperation::MemoriesSearch,
        ApiOperation::BackupsCreate,
        ApiOperation::BackupsCreateSnapshot,
        ApiOperation::BackupsList,
        ApiOperation::AuditLogsIngest,
        ApiOperation::SecretsStore,
        ApiOperation::SecretsRetrieveAll,
    ];

    /// The dotted operation name, e.g. `memories:search`.
    pub fn name(&self) -> &'static str {
        match self {
            ApiOperation::HealthGet => "health:get",
            ApiOperation::AgentHeartbeatStatus => "agents:getHeartbeatStatus",
            ApiOperation::MemoriesCreate => "memories:create",
            ApiOperation::MemoriesSaveThought => "memories:saveThought",
            ApiOperation::MemoriesSearch => "memories:search",
            ApiOperation::BackupsCreate => "backups:create",
            ApiOperation::BackupsCreateSnapshot => "backups:createSnapshot",
            ApiOperation::BackupsList => "backups:list",
            ApiOperation::AuditLogsIngest => "audit_logs:ingest",
            ApiOperation::SecretsStore => "secrets:store",
            ApiOperation::SecretsRetrieveAll => "secrets:retrieveAll",
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            ApiOperation::HealthGet
            | ApiOperation::AgentHeartbeatStatus
            | ApiOperation::MemoriesSearch
            | ApiOperation::BackupsList => HttpMethod::Get,
            ApiOperation::MemoriesCreate
            | ApiOperation::MemoriesSaveThought
            | ApiOperation::BackupsCreate
            | ApiOperation::BackupsCreateSnapshot
            | ApiOperation::AuditLogsIngest
            | ApiOperation::SecretsStore
            | ApiOperation::SecretsRetrieveAll => HttpMethod::Post,
        }
    }

    /// Path of the HTTP endpoint, relative to the API base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ApiOperation::HealthGet => "/v1/health",
            ApiOperation::AgentHeartbeatStatus => "/v1/agents/heartbeat",
            ApiOperation::MemoriesCreate | ApiOperation::MemoriesSaveThought => "/v1/memories",
            ApiOperation::MemoriesSearch => "/v1/memories/search",
            ApiOperation::BackupsCreate
            | ApiOperation::BackupsCreateSnapshot
            | ApiOperation::BackupsList => "/v1/backups",
            ApiOperation::AuditLogsIngest => "/v1/audit-logs",
            ApiOperation::SecretsStore => "/v1/secrets/store",
            ApiOperation::SecretsRetrieveAll => "/v1/secrets/retrieve",
        }
    }
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing an operation name the gateway does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedOperation(pub String);

impl fmt::Display for UnsupportedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported Sentinel API path: {}", self.0)
    }
}

impl std::error::Error for UnsupportedOperation {}

impl FromStr for ApiOperation {
    type Err = UnsupportedOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiOperation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| UnsupportedOperation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for op in ApiOperation::ALL {
            assert_eq!(op.name().parse::<ApiOperation>(), Ok(op));
        }
    }

    #[test]
    fn test_unknown_operation_is_rejected() {
        let err = "memories:delete".parse::<ApiOperation>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported Sentinel API path: memories:delete");
    }

    #[test]
    fn test_aliases_share_endpoint() {
        assert_eq!(
            ApiOperation::MemoriesCreate.endpoint(),
            ApiOperation::MemoriesSaveThought.endpoint()
        );
        assert_eq!(ApiOperation::BackupsCreate.method(), HttpMethod::Post);
        assert_eq!(ApiOperation::BackupsList.method(), HttpMethod::Get);
        assert_eq!(ApiOperation::BackupsList.endpoint(), "/v1/backups");
    }
}
