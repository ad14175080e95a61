//! 外部命令与 SQL 语句构建
//!
//! 名称在加载配置时已校验为普通 SQL 标识符，可以直接拼接

use pgprov_ports::{CommandSpec, PrimaryDescriptor};

use crate::domain::ProvisioningContext;

pub const SHOW_MAX_CONNECTIONS: &str = "SHOW max_connections";

fn with_target(program: &str, primary: &PrimaryDescriptor, admin_user: &str) -> CommandSpec {
    CommandSpec::new(program)
        .arg("-h")
        .arg(primary.address())
        .arg("-p")
        .arg(primary.port().to_string())
        .arg("-U")
        .arg(admin_user)
}

/// `pg_isready -h <addr> -p <port> -U <admin>`
pub fn probe_command(ctx: &ProvisioningContext) -> CommandSpec {
    with_target(&ctx.tools().pg_isready, ctx.primary(), &ctx.names().admin_user)
}

/// 创建登录角色，不授予超级用户、建库和建角色权限
pub fn create_role_command(ctx: &ProvisioningContext) -> CommandSpec {
    with_target(&ctx.tools().createuser, ctx.primary(), &ctx.names().admin_user)
        .arg("--no-superuser")
        .arg("--no-createrole")
        .arg("--no-createdb")
        .arg("--login")
        .arg(&ctx.names().role)
}

/// 创建目标数据库，所有者为服务角色
pub fn create_database_command(ctx: &ProvisioningContext) -> CommandSpec {
    let names = ctx.names();
    with_target(&ctx.tools().createdb, ctx.primary(), &names.admin_user)
        .arg("-O")
        .arg(&names.role)
        .arg(&names.database)
}

pub fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\
         name TEXT PRIMARY KEY, \
         index TEXT NOT NULL, \
         pre TEXT NOT NULL, \
         post TEXT NOT NULL, \
         options TEXT, \
         mtime TIMESTAMP WITH TIME ZONE DEFAULT current_timestamp NOT NULL)",
        table
    )
}

pub fn change_owner_sql(table: &str, role: &str) -> String {
    format!("ALTER TABLE {} OWNER TO {}", table, role)
}

pub fn connection_limit_sql(role: &str, limit: i64) -> String {
    format!("ALTER ROLE {} WITH CONNECTION LIMIT {}", role, limit)
}
