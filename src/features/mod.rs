/// 健康检查
pub mod health;
/// 服务说明（根路径 / 字典与参数范围）
pub mod info;
/// 标记生成
pub mod marker;
