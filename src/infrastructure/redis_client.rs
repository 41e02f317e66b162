// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use redis::{AsyncCommands, Direction, RedisResult};

/// Redis客户端
///
/// 只提供可靠队列需要的列表操作
#[derive(Clone)]
pub struct RedisClient {
    /// Redis客户端
    client: redis::Client,
}

impl RedisClient {
    /// 创建新的Redis客户端实例
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    pub fn new(redis_url: &str) -> RedisResult<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> RedisResult<redis::aio::MultiplexedConnection> {
        self.client.get_multiplexed_async_connection().await
    }

    /// 检查连接
    pub async fn ping(&self) -> RedisResult<()> {
        let mut con = self.connection().await?;
        redis::cmd("PING").query_async::<()>(&mut con).await
    }

    /// 从列表左端插入
    pub async fn lpush(&self, key: &str, value: &str) -> RedisResult<()> {
        let mut con = self.connection().await?;
        con.lpush::<_, _, ()>(key, value).await
    }

    /// 原子地把 `source` 右端元素移到 `destination` 左端
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(String))` - 被移动的元素
    /// * `Ok(None)` - 源列表为空
    pub async fn lmove_right_to_left(
        &self,
        source: &str,
        destination: &str,
    ) -> RedisResult<Option<String>> {
        let mut con = self.connection().await?;
        con.lmove(source, destination, Direction::Right, Direction::Left)
            .await
    }

    /// 原子地把 `source` 左端元素移到 `destination` 右端
    pub async fn lmove_left_to_right(
        &self,
        source: &str,
        destination: &str,
    ) -> RedisResult<Option<String>> {
        let mut con = self.connection().await?;
        con.lmove(source, destination, Direction::Left, Direction::Right)
            .await
    }

    /// 删除列表中一个等于 `value` 的元素，返回删除数量
    pub async fn lrem_one(&self, key: &str, value: &str) -> RedisResult<i64> {
        let mut con = self.connection().await?;
        con.lrem(key, 1, value).await
    }

    /// 在一个事务中把 `value` 从 `source` 移除并放回 `destination` 右端
    pub async fn requeue(&self, source: &str, destination: &str, value: &str) -> RedisResult<()> {
        let mut con = self.connection().await?;
        redis::pipe()
            .atomic()
            .lrem(source, 1, value)
            .ignore()
            .rpush(destination, value)
            .ignore()
            .query_async::<()>(&mut con)
            .await
    }
}
