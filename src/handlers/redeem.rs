use crate::models::*;
use crate::services::RedeemService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/apps/{app_id}/redeem/confirm",
    tag = "redeem",
    params(
        ("app_id" = i64, Path, description = "租户 app ID")
    ),
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "确认成功或幂等命中（already_processed）", body = ConfirmResponse),
        (status = 404, description = "短码不存在或已被拒绝")
    )
)]
/// 核销员确认兑换。重复确认返回 already_processed，不会二次派发积分。
pub async fn confirm(
    service: web::Data<RedeemService>,
    path: web::Path<i64>,
    body: web::Json<ConfirmRequest>,
) -> Result<HttpResponse> {
    let app_id = path.into_inner();
    match service.confirm(app_id, &body.code, body.actor_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/apps/{app_id}/redeem/decline",
    tag = "redeem",
    params(
        ("app_id" = i64, Path, description = "租户 app ID")
    ),
    request_body = DeclineRequest,
    responses(
        (status = 200, description = "拒绝成功（重复拒绝幂等）"),
        (status = 404, description = "短码不存在或已确认")
    )
)]
/// 核销员拒绝兑换，无流水影响
pub async fn decline(
    service: web::Data<RedeemService>,
    path: web::Path<i64>,
    body: web::Json<DeclineRequest>,
) -> Result<HttpResponse> {
    let app_id = path.into_inner();
    match service.decline(app_id, &body.code, body.actor_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": {} }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn redeem_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/apps/{app_id}/redeem")
            .route("/confirm", web::post().to(confirm))
            .route("/decline", web::post().to(decline)),
    );
}
