use crate::models::*;
use crate::services::BroadcastService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/apps/{app_id}/broadcasts",
    tag = "broadcast",
    params(
        ("app_id" = i64, Path, description = "租户 app ID")
    ),
    request_body = SendBroadcastRequest,
    responses(
        (status = 200, description = "群发完成（部分失败也是正常收尾）", body = BroadcastReport),
        (status = 422, description = "该 app 未配置 bot 凭据")
    )
)]
/// 发起一次群发并同步跑完受众投递，返回分类计数
pub async fn send_broadcast(
    service: web::Data<BroadcastService>,
    path: web::Path<i64>,
    body: web::Json<SendBroadcastRequest>,
) -> Result<HttpResponse> {
    let app_id = path.into_inner();
    match service.send(app_id, &body.into_inner()).await {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": report }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn broadcast_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/apps/{app_id}/broadcasts").route("", web::post().to(send_broadcast)),
    );
}
