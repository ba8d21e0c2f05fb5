//! 单元测试辅助
//!
//! `test_case!` 定义测试用例，`kassert!` 记录失败断言而不立即中止，
//! 用例结束时统一打印失败位置并判定失败。
