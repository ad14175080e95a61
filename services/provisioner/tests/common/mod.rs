//! 测试替身
//!
//! 所有替身共享同一个事件日志，用于断言外部调用的顺序

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pgprov_common::RetrySchedule;
use pgprov_errors::{AppError, AppResult};
use pgprov_ports::{
    CommandRunner, CommandSpec, ConnectionPool, PoolFactory, PrimaryDescriptor, PrimaryDiscovery,
    QueryExecutor, QueryRow, SentinelStore,
};
use provisioner::{Flavor, ProvisioningContext, ProvisioningNames, SentinelGate};
use tokio::sync::mpsc;

pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn primary() -> PrimaryDescriptor {
    PrimaryDescriptor::new("10.0.0.5", 5432)
}

pub fn capacity_row(value: &str) -> Vec<QueryRow> {
    vec![QueryRow::new().with("max_connections", Some(value.to_string()))]
}

/// 命令执行替身，可按程序名配置失败
pub struct MockCommands {
    journal: Journal,
    fail_times: Mutex<HashMap<String, u32>>,
    fail_always: Mutex<Vec<String>>,
}

impl MockCommands {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            fail_times: Mutex::new(HashMap::new()),
            fail_always: Mutex::new(Vec::new()),
        }
    }

    /// 前 `times` 次调用失败
    pub fn fail_times(&self, program: &str, times: u32) {
        self.fail_times
            .lock()
            .unwrap()
            .insert(program.to_string(), times);
    }

    pub fn fail_always(&self, program: &str) {
        self.fail_always.lock().unwrap().push(program.to_string());
    }
}

#[async_trait]
impl CommandRunner for MockCommands {
    async fn run(&self, command: &CommandSpec) -> AppResult<()> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("cmd:{}", command));

        let program = command.program_name();
        if self
            .fail_always
            .lock()
            .unwrap()
            .iter()
            .any(|p| p == program)
        {
            return Err(AppError::command(format!("{} exited with status 1", program)));
        }

        let mut fail_times = self.fail_times.lock().unwrap();
        if let Some(remaining) = fail_times.get_mut(program) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(AppError::command(format!("{} exited with status 2", program)));
            }
        }
        Ok(())
    }
}

/// SQL 执行替身，按语句前缀返回预设结果，默认返回空结果
pub struct MockExecutor {
    label: &'static str,
    journal: Journal,
    responses: Mutex<Vec<(String, Result<Vec<QueryRow>, String>)>>,
}

impl MockExecutor {
    pub fn new(label: &'static str, journal: Journal) -> Self {
        Self {
            label,
            journal,
            responses: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(&self, prefix: &str, result: Result<Vec<QueryRow>, String>) {
        self.responses
            .lock()
            .unwrap()
            .push((prefix.to_string(), result));
    }
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn query(&self, sql: &str) -> AppResult<Vec<QueryRow>> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("sql:{}:{}", self.label, sql));

        let responses = self.responses.lock().unwrap();
        match responses.iter().find(|(prefix, _)| sql.starts_with(prefix.as_str())) {
            Some((_, Ok(rows))) => Ok(rows.clone()),
            Some((_, Err(message))) => Err(AppError::database(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

pub struct MockPool {
    pub admin: Arc<MockExecutor>,
    pub target: Arc<MockExecutor>,
    closes: AtomicU32,
}

impl MockPool {
    pub fn new(journal: Journal) -> Self {
        Self {
            admin: Arc::new(MockExecutor::new("admin", journal.clone())),
            target: Arc::new(MockExecutor::new("target", journal)),
            closes: AtomicU32::new(0),
        }
    }

    pub fn closes(&self) -> u32 {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionPool for MockPool {
    fn admin(&self) -> Arc<dyn QueryExecutor> {
        self.admin.clone()
    }

    fn target(&self) -> Arc<dyn QueryExecutor> {
        self.target.clone()
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// 完成标记替身，检查不记入事件日志
pub struct MockSentinel {
    journal: Journal,
    present: AtomicBool,
    fail_check: AtomicBool,
    fail_commit: AtomicBool,
    commits: AtomicU32,
}

impl MockSentinel {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            present: AtomicBool::new(false),
            fail_check: AtomicBool::new(false),
            fail_commit: AtomicBool::new(false),
            commits: AtomicU32::new(0),
        }
    }

    pub fn set_present(&self, present: bool) {
        self.present.store(present, Ordering::SeqCst);
    }

    pub fn fail_check(&self) {
        self.fail_check.store(true, Ordering::SeqCst);
    }

    pub fn fail_commit(&self) {
        self.fail_commit.store(true, Ordering::SeqCst);
    }

    pub fn commits(&self) -> u32 {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentinelStore for MockSentinel {
    async fn exists(&self) -> AppResult<bool> {
        if self.fail_check.load(Ordering::SeqCst) {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "permission denied",
            )));
        }
        Ok(self.present.load(Ordering::SeqCst))
    }

    async fn commit(&self) -> AppResult<()> {
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(AppError::Io(std::io::Error::other("read-only file system")));
        }
        self.journal
            .lock()
            .unwrap()
            .push("sentinel:commit".to_string());
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.present.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// 不等待的调度器，只计数
#[derive(Default)]
pub struct CountingSchedule {
    waits: AtomicU32,
}

impl CountingSchedule {
    pub fn waits(&self) -> u32 {
        self.waits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RetrySchedule for CountingSchedule {
    async fn wait(&self, _attempt: u32) {
        self.waits.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MockDiscovery {
    primary: Option<PrimaryDescriptor>,
}

impl MockDiscovery {
    pub fn announcing(primary: PrimaryDescriptor) -> Self {
        Self {
            primary: Some(primary),
        }
    }

    pub fn silent() -> Self {
        Self { primary: None }
    }
}

#[async_trait]
impl PrimaryDiscovery for MockDiscovery {
    async fn start(&self) -> AppResult<mpsc::Receiver<PrimaryDescriptor>> {
        let (tx, rx) = mpsc::channel(1);
        if let Some(primary) = &self.primary {
            tx.send(primary.clone()).await.unwrap();
        }
        Ok(rx)
    }
}

pub struct MockFactory {
    pool: Arc<MockPool>,
    connects: AtomicU32,
}

impl MockFactory {
    pub fn new(pool: Arc<MockPool>) -> Self {
        Self {
            pool,
            connects: AtomicU32::new(0),
        }
    }

    pub fn connects(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolFactory for MockFactory {
    async fn connect(&self, _primary: &PrimaryDescriptor) -> AppResult<Arc<dyn ConnectionPool>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.pool.clone())
    }
}

/// 一组共享事件日志的替身
pub struct Harness {
    pub journal: Journal,
    pub commands: Arc<MockCommands>,
    pub pool: Arc<MockPool>,
    pub sentinel: Arc<MockSentinel>,
    pub schedule: Arc<CountingSchedule>,
}

impl Harness {
    pub fn new() -> Self {
        let journal: Journal = Arc::new(Mutex::new(Vec::new()));
        Self {
            commands: Arc::new(MockCommands::new(journal.clone())),
            pool: Arc::new(MockPool::new(journal.clone())),
            sentinel: Arc::new(MockSentinel::new(journal.clone())),
            schedule: Arc::new(CountingSchedule::default()),
            journal,
        }
    }

    pub fn context(&self, flavor: Flavor) -> ProvisioningContext {
        self.context_for(primary(), flavor, self.pool.clone())
    }

    pub fn context_for(
        &self,
        primary: PrimaryDescriptor,
        flavor: Flavor,
        pool: Arc<dyn ConnectionPool>,
    ) -> ProvisioningContext {
        ProvisioningContext::new(
            primary,
            flavor,
            pool,
            self.commands.clone(),
            SentinelGate::new(self.sentinel.clone()),
            ProvisioningNames::default(),
        )
        .with_schedule(self.schedule.clone())
    }

    pub fn events(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| event.starts_with(prefix))
            .count()
    }

    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.events()
            .iter()
            .position(|event| event.starts_with(prefix))
    }
}
