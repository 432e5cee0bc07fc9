use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;
use std::sync::Arc;

use spinpass_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::MessengerService,
    handlers,
    middlewares::create_cors,
    services::{
        BroadcastService, LedgerService, PrizeCatalogService, RedeemService, WheelService,
    },
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    let pool = Arc::new(pool);

    // 外部消息网关
    let messenger = MessengerService::new(config.messenger.clone());

    // 创建服务
    let ledger_service = LedgerService::new(pool.clone());
    let catalog_service = PrizeCatalogService::new(pool.clone());
    let wheel_service = WheelService::new(
        pool.clone(),
        ledger_service.clone(),
        catalog_service.clone(),
        messenger.clone(),
        config.wheel.clone(),
    );
    let redeem_service = RedeemService::new(
        pool.clone(),
        ledger_service.clone(),
        catalog_service.clone(),
    );
    let broadcast_service = BroadcastService::new(
        pool.clone(),
        messenger.clone(),
        config.broadcast.clone(),
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(ledger_service.clone()))
            .app_data(web::Data::new(catalog_service.clone()))
            .app_data(web::Data::new(wheel_service.clone()))
            .app_data(web::Data::new(redeem_service.clone()))
            .app_data(web::Data::new(broadcast_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::wheel_config)
                    .configure(handlers::redeem_config)
                    .configure(handlers::wallet_config)
                    .configure(handlers::broadcast_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
