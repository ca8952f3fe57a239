//! Server-side sliding-window script shared by the Redis and REST clients.
//!
//! KEYS: current window, previous window.
//! ARGV: limit, now (ms), window (ms), increment.
//! Returns remaining permits, or -1 when the request is rejected.

pub const SLIDING_WINDOW_SCRIPT: &str = r#"
local currentKey  = KEYS[1]
local previousKey = KEYS[2]
local tokens      = tonumber(ARGV[1])
local now         = tonumber(ARGV[2])
local window      = tonumber(ARGV[3])
local incrementBy = tonumber(ARGV[4])

local requestsInCurrentWindow = tonumber(redis.call("GET", currentKey) or "0")
local requestsInPreviousWindow = tonumber(redis.call("GET", previousKey) or "0")

local percentageInCurrent = (now % window) / window
requestsInPreviousWindow = math.floor((1 - percentageInCurrent) * requestsInPreviousWindow)
if requestsInPreviousWindow + requestsInCurrentWindow >= tokens then
  return -1
end

local newValue = redis.call("INCRBY", currentKey, incrementBy)
if newValue == incrementBy then
  redis.call("PEXPIRE", currentKey, window * 2 + 1000)
end
return tokens - (newValue + requestsInPreviousWindow)
"#;
