use std::time::Duration;

pub(crate) const SERVER_ADDR: &str = "127.0.0.1:14002";

pub(crate) const USERNAME: &str = "user";

/// 15 CURRENCY, 22 BID, 25 ASK, 30 BIDSIZE, 31 ASKSIZE, 260 SEG_FORW, 1352 DSPLY_NMLL
pub(crate) const VIEW_FIDS: &str = "15,22,25,30,31,260,1352";

pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Шаг dispatch-цикла: как часто проверяется shutdown
pub(crate) const DISPATCH_TICK: Duration = Duration::from_millis(200);
