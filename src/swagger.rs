use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{BroadcastSegment, GrantKind, GrantStatus, LedgerSource, SpinStatus};
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::wheel::spin,
        handlers::wheel::claim,
        handlers::wheel::get_prizes,
        handlers::redeem::confirm,
        handlers::redeem::decline,
        handlers::wallet::get_wallet,
        handlers::wallet::adjust,
        handlers::broadcast::send_broadcast,
    ),
    components(
        schemas(
            SpinRequest,
            SpinResponse,
            WonPrize,
            ClaimRequest,
            ClaimResponse,
            PrizeResponse,
            ConfirmRequest,
            ConfirmResponse,
            DeclineRequest,
            SendBroadcastRequest,
            BroadcastReport,
            WalletQuery,
            LedgerEntryResponse,
            AdjustRequest,
            LedgerApply,
            LedgerSource,
            SpinStatus,
            GrantStatus,
            GrantKind,
            BroadcastSegment,
        )
    ),
    tags(
        (name = "wheel", description = "转盘抽奖"),
        (name = "redeem", description = "兑换码核销"),
        (name = "wallet", description = "积分钱包"),
        (name = "broadcast", description = "消息群发")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
