use crate::models::*;
use crate::services::{PrizeCatalogService, WheelService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/apps/{app_id}/wheel/spin",
    tag = "wheel",
    params(
        ("app_id" = i64, Path, description = "租户 app ID")
    ),
    request_body = SpinRequest,
    responses(
        (status = 200, description = "抽奖成功（含幂等返回已有未领取实例）", body = SpinResponse),
        (status = 400, description = "余额不足"),
        (status = 409, description = "没有可用奖品（费用已退）")
    )
)]
/// 抽一次转盘:
/// 1. 已有未领取实例时原样返回，不再扣费
/// 2. 扣除本次费用（按实例派生幂等键，重试不会二次扣费）
/// 3. 按权重随机选奖，空奖池自动退费
pub async fn spin(
    service: web::Data<WheelService>,
    path: web::Path<i64>,
    body: web::Json<SpinRequest>,
) -> Result<HttpResponse> {
    let app_id = path.into_inner();
    match service.draw(app_id, body.account_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/apps/{app_id}/wheel/claim",
    tag = "wheel",
    params(
        ("app_id" = i64, Path, description = "租户 app ID")
    ),
    request_body = ClaimRequest,
    responses(
        (status = 200, description = "领取成功，返回兑换短码", body = ClaimResponse),
        (status = 409, description = "没有可领取的奖品")
    )
)]
/// 领取已中奖实例，生成报给核销员的兑换短码并通过 bot 通知用户
pub async fn claim(
    service: web::Data<WheelService>,
    path: web::Path<i64>,
    body: web::Json<ClaimRequest>,
) -> Result<HttpResponse> {
    let app_id = path.into_inner();
    match service.claim(app_id, body.account_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/apps/{app_id}/wheel/prizes",
    tag = "wheel",
    params(
        ("app_id" = i64, Path, description = "租户 app ID")
    ),
    responses(
        (status = 200, description = "获取奖品目录成功", body = [PrizeResponse])
    )
)]
/// 当前参与抽取的奖品目录（启用且权重为正）
pub async fn get_prizes(
    catalog: web::Data<PrizeCatalogService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let app_id = path.into_inner();
    match catalog.list_view(app_id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn wheel_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/apps/{app_id}/wheel")
            .route("/spin", web::post().to(spin))
            .route("/claim", web::post().to(claim))
            .route("/prizes", web::get().to(get_prizes)),
    );
}
