use crate::entities::LedgerSource;
use crate::models::*;
use crate::services::LedgerService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/apps/{app_id}/wallet/{account_id}",
    tag = "wallet",
    params(
        ("app_id" = i64, Path, description = "租户 app ID"),
        ("account_id" = i64, Path, description = "账户 ID"),
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    responses(
        (status = 200, description = "余额与流水（倒序分页）", body = WalletResponse)
    )
)]
/// 钱包视图：当前余额 + 流水分页
pub async fn get_wallet(
    service: web::Data<LedgerService>,
    path: web::Path<(i64, i64)>,
    query: web::Query<WalletQuery>,
) -> Result<HttpResponse> {
    let (app_id, account_id) = path.into_inner();
    match service.wallet(app_id, account_id, &query.into_inner()).await {
        Ok(wallet) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": wallet }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/apps/{app_id}/wallet/{account_id}/adjust",
    tag = "wallet",
    params(
        ("app_id" = i64, Path, description = "租户 app ID"),
        ("account_id" = i64, Path, description = "账户 ID")
    ),
    request_body = AdjustRequest,
    responses(
        (status = 200, description = "调整入账（或幂等命中）", body = LedgerApply),
        (status = 400, description = "余额不足")
    )
)]
/// 运营手工调整余额。带幂等键时重试安全；
/// 负向调整不允许把余额调成负数。
pub async fn adjust(
    service: web::Data<LedgerService>,
    path: web::Path<(i64, i64)>,
    body: web::Json<AdjustRequest>,
) -> Result<HttpResponse> {
    let (app_id, account_id) = path.into_inner();
    let req = body.into_inner();
    match service
        .apply_delta(
            app_id,
            account_id,
            req.delta,
            LedgerSource::Manual,
            "manual_adjust",
            req.note.as_deref(),
            req.idempotency_key.as_deref(),
            false,
        )
        .await
    {
        Ok(applied) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": applied }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn wallet_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/apps/{app_id}/wallet")
            .route("/{account_id}", web::get().to(get_wallet))
            .route("/{account_id}/adjust", web::post().to(adjust)),
    );
}
