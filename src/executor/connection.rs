use crate::executor::Database;
use crate::model::Value;
use log::{debug, error, info};
use odbc_api::{
    buffers::TextRowSet, handles::StatementImpl, parameter::InputParameter, Bit, Connection,
    ConnectionOptions, Cursor, Environment, Error as OdbcError, IntoParameter, Prepared,
};
use std::sync::Arc;

const FETCH_BATCH: usize = 100;
const MAX_TEXT_LEN: usize = 4096;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("ODBC error: {0}")]
    Odbc(#[from] OdbcError),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),
}

pub struct ConnectionManager {
    environment: Arc<Environment>,
}

impl ConnectionManager {
    pub fn new() -> Result<Self, ConnectionError> {
        let environment = Environment::new()?;
        Ok(Self {
            environment: Arc::new(environment),
        })
    }

    pub fn connect(&self, connection_string: &str) -> Result<Connection<'_>, ConnectionError> {
        debug!(
            "Connecting to database with connection string length: {}",
            connection_string.len()
        );

        let connection = self
            .environment
            .connect_with_connection_string(connection_string, ConnectionOptions::default())
            .map_err(|e| {
                error!("Failed to connect to database: {}", e);
                ConnectionError::ConnectionFailed(e.to_string())
            })?;

        info!("Successfully connected to database");
        Ok(connection)
    }

    /// Open a connection wrapped as a [`Database`]
    pub fn open(&self, connection_string: &str) -> Result<OdbcDatabase<'_>, ConnectionError> {
        Ok(OdbcDatabase::new(self.connect(connection_string)?))
    }
}

/// ODBC connection exposed through the [`Database`] capability
pub struct OdbcDatabase<'env> {
    connection: Connection<'env>,
}

impl<'env> OdbcDatabase<'env> {
    pub fn new(connection: Connection<'env>) -> Self {
        Self { connection }
    }

    fn bind(args: &[Value]) -> Vec<Box<dyn InputParameter>> {
        args.iter().map(to_parameter).collect()
    }

    fn fetch_rows(
        &self,
        sql: &str,
        args: &[Value],
        limit: Option<usize>,
    ) -> Result<Vec<Vec<Option<String>>>, ConnectionError> {
        let params = Self::bind(args);
        let mut prepared = self
            .connection
            .prepare(sql)
            .map_err(|e| ConnectionError::QueryFailed(e.to_string()))?;

        let mut cursor = prepared
            .execute(params.as_slice())
            .map_err(|e| ConnectionError::QueryFailed(e.to_string()))?
            .ok_or_else(|| ConnectionError::QueryFailed("Query returned no cursor".to_string()))?;

        let batch = limit.unwrap_or(FETCH_BATCH).min(FETCH_BATCH);
        let mut buffer = TextRowSet::for_cursor(batch, &mut cursor, Some(MAX_TEXT_LEN))?;
        let mut row_set_cursor = cursor.bind_buffer(&mut buffer)?;
        let mut results = Vec::new();

        'fetch: while let Some(row_set) = row_set_cursor.fetch()? {
            for row_index in 0..row_set.num_rows() {
                if limit.is_some_and(|max| results.len() >= max) {
                    break 'fetch;
                }
                let row = (0..row_set.num_cols())
                    .map(|col_index| {
                        row_set
                            .at(col_index, row_index)
                            .map(|v| String::from_utf8_lossy(v).to_string())
                    })
                    .collect();
                results.push(row);
            }
        }

        debug!("Query returned {} rows", results.len());
        Ok(results)
    }
}

fn to_parameter(value: &Value) -> Box<dyn InputParameter> {
    match value {
        Value::Null => Box::new(None::<String>.into_parameter()),
        Value::Bool(b) => Box::new(Bit::from_bool(*b)),
        Value::Int(i) => Box::new(*i),
        Value::Float(x) => Box::new(*x),
        Value::Text(s) => Box::new(s.clone().into_parameter()),
        Value::Bytes(b) => Box::new(b.clone().into_parameter()),
    }
}

impl<'env> Database for OdbcDatabase<'env> {
    type Error = ConnectionError;
    type ExecResult = ();
    type Rows = Vec<Vec<Option<String>>>;
    type Row = Vec<Option<String>>;
    type Statement<'s>
        = Prepared<StatementImpl<'s>>
    where
        Self: 's;

    fn execute(&self, sql: &str, args: &[Value]) -> Result<(), ConnectionError> {
        debug!("Executing SQL statement: {}", sql);
        let params = Self::bind(args);
        let mut prepared = self
            .connection
            .prepare(sql)
            .map_err(|e| ConnectionError::QueryFailed(e.to_string()))?;

        match prepared.execute(params.as_slice()) {
            Ok(_) => {
                debug!("Statement executed successfully");
                Ok(())
            }
            Err(e) => {
                error!("Statement execution failed: {}", e);
                Err(ConnectionError::QueryFailed(e.to_string()))
            }
        }
    }

    fn prepare(&self, sql: &str) -> Result<Self::Statement<'_>, ConnectionError> {
        debug!("Preparing SQL statement: {}", sql);
        self.connection
            .prepare(sql)
            .map_err(|e| ConnectionError::QueryFailed(e.to_string()))
    }

    fn query(&self, sql: &str, args: &[Value]) -> Result<Self::Rows, ConnectionError> {
        debug!("Querying multiple rows: {}", sql);
        self.fetch_rows(sql, args, None)
    }

    fn query_row(&self, sql: &str, args: &[Value]) -> Result<Option<Self::Row>, ConnectionError> {
        debug!("Querying single row: {}", sql);
        Ok(self.fetch_rows(sql, args, Some(1))?.into_iter().next())
    }
}
