// ==========================================
// 货运运力撮合系统 - 货载状态机守卫
// ==========================================
// 职责: 校验对货载发起的操作在当前状态下是否合法
// 红线: 纯守卫,不改状态;状态落库由调用方负责
// ==========================================
// 规则:
// - BID:    BOOKED / CANCELLED 状态下禁止
// - CANCEL: BOOKED 状态下禁止
// - BOOK:   CANCELLED 状态下禁止
// - 置为 BOOKED 仅当 remaining_trucks == 0
// ==========================================

use thiserror::Error;

use crate::domain::types::{LoadAction, LoadStatus};

/// 状态机规则违反
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("无效的状态流转: {0}")]
pub struct InvalidTransition(pub String);

// ==========================================
// StatusValidator - 状态机守卫
// ==========================================
pub struct StatusValidator;

impl StatusValidator {
    /// 校验动作在当前货载状态下是否允许
    pub fn validate_action(
        current: LoadStatus,
        action: LoadAction,
    ) -> Result<(), InvalidTransition> {
        match action {
            LoadAction::Bid => {
                if current == LoadStatus::Booked || current == LoadStatus::Cancelled {
                    return Err(InvalidTransition(format!(
                        "货载状态为 {} 时禁止竞价",
                        current
                    )));
                }
            }
            LoadAction::Cancel => {
                if current == LoadStatus::Booked {
                    return Err(InvalidTransition(format!(
                        "货载状态为 {} 时禁止取消",
                        current
                    )));
                }
            }
            LoadAction::Book => {
                if current == LoadStatus::Cancelled {
                    return Err(InvalidTransition(format!(
                        "货载状态为 {} 时禁止预订",
                        current
                    )));
                }
            }
        }
        Ok(())
    }

    /// 校验货载是否满足置为 BOOKED 的条件
    pub fn validate_booked_status(remaining_trucks: i32) -> Result<(), InvalidTransition> {
        if remaining_trucks != 0 {
            return Err(InvalidTransition(format!(
                "仅当 remaining_trucks 为 0 时货载才可置为 BOOKED (当前: {})",
                remaining_trucks
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bid_allowed_on_posted_and_open() {
        assert!(StatusValidator::validate_action(LoadStatus::Posted, LoadAction::Bid).is_ok());
        assert!(
            StatusValidator::validate_action(LoadStatus::OpenForBids, LoadAction::Bid).is_ok()
        );
    }

    #[test]
    fn test_bid_forbidden_on_booked_and_cancelled() {
        assert!(StatusValidator::validate_action(LoadStatus::Booked, LoadAction::Bid).is_err());
        assert!(
            StatusValidator::validate_action(LoadStatus::Cancelled, LoadAction::Bid).is_err()
        );
    }

    #[test]
    fn test_cancel_forbidden_only_on_booked() {
        assert!(
            StatusValidator::validate_action(LoadStatus::Booked, LoadAction::Cancel).is_err()
        );
        assert!(
            StatusValidator::validate_action(LoadStatus::Posted, LoadAction::Cancel).is_ok()
        );
        // 已取消的货载再次取消不被状态机拦截
        assert!(
            StatusValidator::validate_action(LoadStatus::Cancelled, LoadAction::Cancel).is_ok()
        );
    }

    #[test]
    fn test_book_forbidden_only_on_cancelled() {
        assert!(
            StatusValidator::validate_action(LoadStatus::Cancelled, LoadAction::Book).is_err()
        );
        assert!(StatusValidator::validate_action(LoadStatus::Booked, LoadAction::Book).is_ok());
    }

    #[test]
    fn test_booked_status_requires_zero_remaining() {
        assert!(StatusValidator::validate_booked_status(0).is_ok());
        assert!(StatusValidator::validate_booked_status(1).is_err());
        assert!(StatusValidator::validate_booked_status(-1).is_err());
    }
}
