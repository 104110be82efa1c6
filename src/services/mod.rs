/*
 * Responsibility
 * - ドメインロジック (authorize gate) と外部コラボレータの境界
 */
pub mod authorize;
pub mod events;
pub mod localization;
pub mod scopes;
pub mod validation;
