// ==========================================
// 货运运力撮合系统 - 领域类型定义
// ==========================================
// 红线: 货载与预订使用各自独立的状态枚举,互不复用
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 货载状态 (Load Status)
// ==========================================
// 生命周期: POSTED -> OPEN_FOR_BIDS -> BOOKED
//           任意非 BOOKED 状态均可 -> CANCELLED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadStatus {
    Posted,      // 已发布,尚无竞价
    OpenForBids, // 开放竞价
    Booked,      // 运力耗尽,已订满
    Cancelled,   // 已取消
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStatus::Posted => write!(f, "POSTED"),
            LoadStatus::OpenForBids => write!(f, "OPEN_FOR_BIDS"),
            LoadStatus::Booked => write!(f, "BOOKED"),
            LoadStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl LoadStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "POSTED" => LoadStatus::Posted,
            "OPEN_FOR_BIDS" => LoadStatus::OpenForBids,
            "BOOKED" => LoadStatus::Booked,
            "CANCELLED" => LoadStatus::Cancelled,
            _ => LoadStatus::Posted, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            LoadStatus::Posted => "POSTED",
            LoadStatus::OpenForBids => "OPEN_FOR_BIDS",
            LoadStatus::Booked => "BOOKED",
            LoadStatus::Cancelled => "CANCELLED",
        }
    }
}

// ==========================================
// 竞价状态 (Bid Status)
// ==========================================
// PENDING -> ACCEPTED (每个货载至多一个) / REJECTED (终态)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BidStatus {
    Pending,  // 待定
    Accepted, // 已接受
    Rejected, // 已拒绝
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BidStatus::Pending => write!(f, "PENDING"),
            BidStatus::Accepted => write!(f, "ACCEPTED"),
            BidStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

impl BidStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PENDING" => BidStatus::Pending,
            "ACCEPTED" => BidStatus::Accepted,
            "REJECTED" => BidStatus::Rejected,
            _ => BidStatus::Pending, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            BidStatus::Pending => "PENDING",
            BidStatus::Accepted => "ACCEPTED",
            BidStatus::Rejected => "REJECTED",
        }
    }
}

// ==========================================
// 预订状态 (Booking Status)
// ==========================================
// CONFIRMED -> CANCELLED (终态)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed, // 已确认
    Cancelled, // 已取消
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Confirmed => write!(f, "CONFIRMED"),
            BookingStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl BookingStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "CONFIRMED" => BookingStatus::Confirmed,
            "CANCELLED" => BookingStatus::Cancelled,
            _ => BookingStatus::Confirmed, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

// ==========================================
// 重量单位 (Weight Unit)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeightUnit {
    Kg,  // 千克
    Ton, // 吨
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightUnit::Kg => write!(f, "KG"),
            WeightUnit::Ton => write!(f, "TON"),
        }
    }
}

impl WeightUnit {
    /// 从字符串解析重量单位
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "KG" => WeightUnit::Kg,
            "TON" => WeightUnit::Ton,
            _ => WeightUnit::Kg, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "KG",
            WeightUnit::Ton => "TON",
        }
    }
}

// ==========================================
// 货载动作 (Load Action)
// ==========================================
// 用途: 状态机守卫的输入,标识对货载发起的操作类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadAction {
    Bid,    // 提交竞价
    Cancel, // 取消货载
    Book,   // 创建预订
}

impl fmt::Display for LoadAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadAction::Bid => write!(f, "BID"),
            LoadAction::Cancel => write!(f, "CANCEL"),
            LoadAction::Book => write!(f, "BOOK"),
        }
    }
}
